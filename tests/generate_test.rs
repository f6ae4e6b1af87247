use std::io::Read;
use std::path::{Path, PathBuf};

use eventdoc::{EventRecord, Settings, Workspace, generate_documents};

fn test_settings(dir: &Path) -> Settings {
    Settings {
        upload_dir: dir.join("uploads").to_string_lossy().to_string(),
        output_dir: dir.join("outputs").to_string_lossy().to_string(),
        logo_path: None,
        ..Default::default()
    }
}

fn sample_record() -> EventRecord {
    EventRecord {
        ref_no: "SEC/MCT/2024/17".to_string(),
        date_ref: "12-03-2024".to_string(),
        title: "Robotics Workshop".to_string(),
        department: "MECHATRONICS".to_string(),
        academic_year: "2023-2024".to_string(),
        date_activity: "10-03-2024".to_string(),
        organized_by: "Dept. of Mechatronics".to_string(),
        overview: "A hands-on workshop covering robot kinematics and control.".to_string(),
        conclusion: "The event concluded with a demonstration session.".to_string(),
        circular_text: "All students are invited to attend the workshop.".to_string(),
        ..Default::default()
    }
}

fn write_png(path: &Path, width: u32, height: u32) {
    image::RgbImage::new(width, height)
        .save(path)
        .expect("write png fixture");
}

fn document_xml(path: &Path) -> String {
    let file = std::fs::File::open(path).expect("open docx");
    let mut archive = zip::ZipArchive::new(file).expect("read docx package");
    let mut entry = archive
        .by_name("word/document.xml")
        .expect("document.xml entry");
    let mut xml = String::new();
    entry.read_to_string(&mut xml).expect("read document.xml");
    xml
}

#[test]
fn produces_both_artifacts_with_sanitized_base_name() {
    let dir = tempfile::tempdir().expect("tempdir");
    let settings = test_settings(dir.path());
    let workspace = Workspace::new(&settings).expect("workspace");

    let artifacts = generate_documents(&sample_record(), None, &[], &settings, &workspace)
        .expect("generate documents");

    assert_eq!(artifacts.base_name, "Robotics_Workshop");
    assert!(artifacts.docx.ends_with("Robotics_Workshop.docx"));
    assert!(artifacts.docx.exists());
    let pdf = artifacts.pdf.expect("pdf artifact");
    assert!(pdf.ends_with("Robotics_Workshop.pdf"));
    let bytes = std::fs::read(&pdf).expect("read pdf");
    assert!(bytes.starts_with(b"%PDF"));
}

#[test]
fn day_sections_are_omitted_when_empty() {
    let dir = tempfile::tempdir().expect("tempdir");
    let settings = test_settings(dir.path());
    let workspace = Workspace::new(&settings).expect("workspace");

    let artifacts = generate_documents(&sample_record(), None, &[], &settings, &workspace)
        .expect("generate documents");
    let xml = document_xml(&artifacts.docx);

    assert!(xml.contains("REPORT OF THE EVENT"));
    assert!(xml.contains("Workshop Overview"));
    assert!(!xml.contains("Day 1"));
    assert!(!xml.contains("Day 2"));
}

#[test]
fn day_sections_render_when_present() {
    let dir = tempfile::tempdir().expect("tempdir");
    let settings = test_settings(dir.path());
    let workspace = Workspace::new(&settings).expect("workspace");

    let record = EventRecord {
        day1: "Introductory sessions and live demonstrations.".to_string(),
        day2: "Fault diagnosis practice on lab rigs.".to_string(),
        learning_outcomes: "Participants can assemble a basic manipulator.".to_string(),
        ..sample_record()
    };
    let artifacts =
        generate_documents(&record, None, &[], &settings, &workspace).expect("generate documents");
    let xml = document_xml(&artifacts.docx);

    assert!(xml.contains("Day 1: Fundamentals and Demonstrations"));
    assert!(xml.contains("Day 2: Advanced Troubleshooting and Maintenance"));
    assert!(xml.contains("Learning Outcomes"));
}

#[test]
fn zero_photos_render_a_single_notice() {
    let dir = tempfile::tempdir().expect("tempdir");
    let settings = test_settings(dir.path());
    let workspace = Workspace::new(&settings).expect("workspace");

    let artifacts = generate_documents(&sample_record(), None, &[], &settings, &workspace)
        .expect("generate documents");
    let xml = document_xml(&artifacts.docx);

    assert_eq!(xml.matches("No photos uploaded.").count(), 1);
    // Only the details table and the signature table exist.
    assert_eq!(xml.matches("<w:tbl>").count(), 2);
}

#[test]
fn odd_photo_count_fills_rows_in_pairs() {
    let dir = tempfile::tempdir().expect("tempdir");
    let settings = test_settings(dir.path());
    let workspace = Workspace::new(&settings).expect("workspace");

    let mut photos = Vec::new();
    for i in 0..3 {
        let path = dir.path().join(format!("photo{}.png", i));
        write_png(&path, 80, 60);
        photos.push(path);
    }
    let artifacts = generate_documents(&sample_record(), None, &photos, &settings, &workspace)
        .expect("generate documents");
    let xml = document_xml(&artifacts.docx);

    // ceil(3/2) photo-pair tables on top of the details and signature tables.
    assert_eq!(xml.matches("<w:tbl>").count(), 4);
    assert_eq!(xml.matches("<w:drawing>").count(), 3);
    assert!(!xml.contains("No photos uploaded."));
}

#[test]
fn undecodable_photo_becomes_a_cell_notice() {
    let dir = tempfile::tempdir().expect("tempdir");
    let settings = test_settings(dir.path());
    let workspace = Workspace::new(&settings).expect("workspace");

    let good = dir.path().join("good.png");
    write_png(&good, 80, 60);
    let broken = dir.path().join("broken.png");
    std::fs::write(&broken, b"this is not a png").expect("write fixture");

    let photos = vec![good, broken];
    let artifacts = generate_documents(&sample_record(), None, &photos, &settings, &workspace)
        .expect("generate documents");
    let xml = document_xml(&artifacts.docx);

    assert_eq!(xml.matches("<w:drawing>").count(), 1);
    assert!(xml.contains("(Unable to add image: broken.png)"));
}

#[test]
fn undecodable_invitation_falls_back_to_circular_text() {
    let dir = tempfile::tempdir().expect("tempdir");
    let settings = test_settings(dir.path());
    let workspace = Workspace::new(&settings).expect("workspace");

    let broken = dir.path().join("invite.png");
    std::fs::write(&broken, b"junk bytes").expect("write fixture");

    let artifacts = generate_documents(
        &sample_record(),
        Some(&broken),
        &[],
        &settings,
        &workspace,
    )
    .expect("generate documents");
    let xml = document_xml(&artifacts.docx);

    assert!(xml.contains("All students are invited to attend the workshop."));
    assert_eq!(xml.matches("<w:drawing>").count(), 0);
}

#[test]
fn decodable_invitation_replaces_circular_text() {
    let dir = tempfile::tempdir().expect("tempdir");
    let settings = test_settings(dir.path());
    let workspace = Workspace::new(&settings).expect("workspace");

    let invite = dir.path().join("invite.png");
    write_png(&invite, 320, 200);

    let artifacts = generate_documents(
        &sample_record(),
        Some(&invite),
        &[],
        &settings,
        &workspace,
    )
    .expect("generate documents");
    let xml = document_xml(&artifacts.docx);

    assert_eq!(xml.matches("<w:drawing>").count(), 1);
    assert!(!xml.contains("All students are invited to attend the workshop."));
}

#[test]
fn identical_inputs_produce_identical_document_text() {
    let dir = tempfile::tempdir().expect("tempdir");
    let settings = test_settings(dir.path());
    let workspace = Workspace::new(&settings).expect("workspace");

    let photo = dir.path().join("photo.png");
    write_png(&photo, 64, 48);
    let photos = vec![photo];

    let first = generate_documents(&sample_record(), None, &photos, &settings, &workspace)
        .expect("first build");
    let first_xml = document_xml(&first.docx);

    let second = generate_documents(&sample_record(), None, &photos, &settings, &workspace)
        .expect("second build");
    let second_xml = document_xml(&second.docx);

    assert_eq!(first_xml, second_xml);
}

#[test]
fn blank_title_uses_the_default_base_name() {
    let dir = tempfile::tempdir().expect("tempdir");
    let settings = test_settings(dir.path());
    let workspace = Workspace::new(&settings).expect("workspace");

    let record = EventRecord {
        title: String::new(),
        ..sample_record()
    };
    let artifacts =
        generate_documents(&record, None, &[], &settings, &workspace).expect("generate documents");
    assert_eq!(artifacts.base_name, "event");
    assert!(artifacts.docx.ends_with("event.docx"));
}

#[test]
fn generation_aborts_when_destination_is_unwritable() {
    let dir = tempfile::tempdir().expect("tempdir");
    let settings = test_settings(dir.path());
    let workspace = Workspace::new(&settings).expect("workspace");

    // Pull the outputs directory out from under the workspace.
    std::fs::remove_dir_all(dir.path().join("outputs")).expect("remove outputs");

    let err = generate_documents(&sample_record(), None, &[], &settings, &workspace).unwrap_err();
    assert!(matches!(err, eventdoc::BuildError::DocumentBuild(_)));
}

#[test]
fn photo_order_is_preserved_in_the_document() {
    let dir = tempfile::tempdir().expect("tempdir");
    let settings = test_settings(dir.path());
    let workspace = Workspace::new(&settings).expect("workspace");

    // One decodable and one broken photo per pair; the notices pin the order.
    let first = dir.path().join("aaa.png");
    std::fs::write(&first, b"broken-1").expect("write fixture");
    let second = dir.path().join("bbb.png");
    std::fs::write(&second, b"broken-2").expect("write fixture");
    let photos: Vec<PathBuf> = vec![first, second];

    let artifacts = generate_documents(&sample_record(), None, &photos, &settings, &workspace)
        .expect("generate documents");
    let xml = document_xml(&artifacts.docx);

    let first_at = xml.find("(Unable to add image: aaa.png)").expect("first notice");
    let second_at = xml
        .find("(Unable to add image: bbb.png)")
        .expect("second notice");
    assert!(first_at < second_at);
}
