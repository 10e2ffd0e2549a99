//! Integration tests for assembling reports with ReportGenerator.
//!
//! Reports are written uncompressed so page content can be inspected as text.

use std::io::Cursor;
use std::path::{Path, PathBuf};

use pdf_report::geometry::pt_to_mm;
use pdf_report::{Error, ReportConfig, ReportGenerator, TableStyle};

/// Write a solid-colour PNG to `dir` and return its path.
fn write_png(dir: &Path, name: &str, width: u32, height: u32) -> PathBuf {
    let img = image::RgbImage::from_pixel(width, height, image::Rgb([30, 60, 84]));
    let mut bytes = Vec::new();
    image::DynamicImage::ImageRgb8(img)
        .write_to(&mut Cursor::new(&mut bytes), image::ImageOutputFormat::Png)
        .unwrap();
    let path = dir.join(name);
    std::fs::write(&path, bytes).unwrap();
    path
}

fn uncompressed(name: &str) -> ReportGenerator {
    ReportGenerator::new(ReportConfig::new().with_report_name(name).with_compress(false)).unwrap()
}

fn pdf_text(report: &mut ReportGenerator) -> String {
    String::from_utf8_lossy(&report.to_bytes().unwrap()).into_owned()
}

#[test]
fn test_demo_report_flow() {
    let dir = tempfile::tempdir().unwrap();
    let logo = write_png(dir.path(), "Logo.png", 120, 36);

    let mut report = uncompressed("demo");
    report.set_logo_path(logo.to_string_lossy());
    report.set_title("COMPANY NAME - REPORT DATE");
    report.set_font("Arial", "B", 16.0).unwrap();
    report.add_page().unwrap();
    report.create_cover_page("This is the cover page").unwrap();
    report.create_section_heading("Section").unwrap();

    report
        .add_vertical_bar_graph("test", &["Cat", "Dog", "Bird"], &[0.0, 1.0, 2.0], "Animal", "Quantity")
        .unwrap();
    report.ln(None);
    report
        .add_horizontal_bar_graph("test2", &["Cat", "Dog", "Bird"], &[0.0, 1.0, 2.0], "Animal", "Quantity")
        .unwrap();
    report.ln(None);
    report
        .add_pie_chart("test3", &["CAT", "DOG", "BIRD", "PLANE"], &[2.0, 4.0, 5.0, 7.0])
        .unwrap();
    report
        .add_line_chart("test4", &["CAT", "DOG", "BIRD", "PLANE"], &[2.0, 4.0, 5.0, 7.0], "", "")
        .unwrap();
    report
        .add_histogram("test5", &[2.0, 2.0, 3.0, 7.0, 4.0, 4.0, 5.0, 7.0], "", "")
        .unwrap();

    let out = dir.path().join("Here.pdf");
    report.output(&out).unwrap();
    let bytes = std::fs::read(&out).unwrap();
    assert!(bytes.starts_with(b"%PDF-1.7"));
    assert!(bytes.ends_with(b"%%EOF"));

    let text = String::from_utf8_lossy(&bytes);
    assert!(text.contains("(THIS IS THE COVER PAGE) Tj"));
    assert!(text.contains("(SECTION) Tj"));
    assert!(text.contains("/Title (demo)"));
    // Header title and logo on every page
    let pages = report.page_count();
    assert!(pages >= 3);
    assert_eq!(text.matches("(COMPANY NAME - REPORT DATE) Tj").count(), pages);
    assert_eq!(text.matches("/Im1 Do").count(), pages);
}

#[test]
fn test_add_image_flows_at_natural_size() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_png(dir.path(), "chart.png", 144, 72);

    let mut report = uncompressed("images");
    report.add_page().unwrap();
    report.create_section_heading("Figures").unwrap();
    let y = report.canvas().y();
    report.add_image(&path).unwrap();

    // Line break of the heading's 5 mm, then 72 pt of image
    let expected = y + 5.0 + pt_to_mm(72.0);
    assert!((report.canvas().y() - expected).abs() < 1e-3);
    assert!(pdf_text(&mut report).contains("/Im1 Do"));
}

#[test]
fn test_add_image_errors() {
    let mut report = uncompressed("images");
    report.add_page().unwrap();
    assert!(matches!(report.add_image(""), Err(Error::MissingArgument(_))));
    assert!(report.add_image("/definitely/not/here.png").is_err());
}

#[test]
fn test_paragraph_wraps_and_breaks_pages() {
    let mut report = uncompressed("text");
    report.add_page().unwrap();
    let sentence = "Revenue grew steadily across every region this quarter. ";
    report.create_paragraph(&sentence.repeat(200)).unwrap();
    assert!(report.page_count() > 1);
}

#[test]
fn test_table_default_style() {
    let mut report = uncompressed("table");
    report.add_page().unwrap();
    let rows = vec![vec!["Cat", "3"], vec!["Dog", "4"], vec!["Bird", "1"]];
    report.create_table(&rows, &["Pet", "Count"]).unwrap();

    let text = pdf_text(&mut report);
    // Header fill (30, 60, 84) and stripe fill (188, 227, 222)
    assert!(text.contains("0.11765 0.23529 0.32941 rg"));
    assert!(text.contains("0.73725 0.8902 0.87059 rg"));
    assert!(text.contains("(Pet) Tj"));
    assert!(text.contains("(Bird) Tj"));
}

#[test]
fn test_table_custom_style_and_errors() {
    let mut report = uncompressed("table");
    report.add_page().unwrap();

    let empty: Vec<Vec<String>> = Vec::new();
    assert!(report.create_table(&empty, &["a"]).is_err());

    let style = TableStyle {
        repeat_header: false,
        body_font_size: 10.0,
        ..TableStyle::default()
    };
    let rows: Vec<Vec<u32>> = (0..60).map(|i| vec![i, i * i]).collect();
    report.create_table_with_style(&rows, &["n", "n^2"], &style).unwrap();
    assert!(report.page_count() > 1);
    assert_eq!(pdf_text(&mut report).matches("(n^2) Tj").count(), 1);
}

#[test]
fn test_page_numbers_in_footer() {
    let config = ReportConfig::new()
        .with_report_name("numbered")
        .with_title("ACME")
        .with_page_numbers(true)
        .with_compress(false);
    let mut report = ReportGenerator::new(config).unwrap();
    report.add_page().unwrap();
    report.add_page().unwrap();
    let text = pdf_text(&mut report);
    assert!(text.contains("(Page 1) Tj"));
    assert!(text.contains("(Page 2) Tj"));
}

#[test]
fn test_to_bytes_is_repeatable() {
    let mut report = uncompressed("twice");
    report.add_page().unwrap();
    report.create_paragraph("Hello").unwrap();
    let first = report.to_bytes().unwrap();
    let second = report.to_bytes().unwrap();
    assert_eq!(first.len(), second.len());
}

#[test]
fn test_output_without_pages_fails() {
    let dir = tempfile::tempdir().unwrap();
    let mut report = uncompressed("empty");
    let err = report.output(dir.path().join("empty.pdf")).unwrap_err();
    assert!(matches!(err, Error::NoPage));
}
