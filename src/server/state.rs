use crate::paths::Workspace;
use crate::settings::Settings;

pub(crate) struct ServerState {
    pub(crate) settings: Settings,
    pub(crate) workspace: Workspace,
}
