mod common;

use common::pdf_assertions::{count_images, form_contents, resource_names};
use common::{TestResult, render_slip};
use pagewright::layout::LayoutError;
use pagewright::render_core::RenderError;
use pagewright::{DeliverySlip, PageSetupConfig, PagewrightError, RenderConfig};

const A4_WIDTH_PT: f32 = 595.28;
const A4_HEIGHT_PT: f32 = 841.89;

#[test]
fn test_default_slip_spans_pages() -> TestResult {
    let pdf = render_slip(&RenderConfig::default())?;

    assert_pdf_min_pages!(pdf, 2);
    for page in 1..=pdf.page_count() as u32 {
        assert_pdf_page_size!(pdf, page, A4_WIDTH_PT, A4_HEIGHT_PT);
    }
    assert_pdf_has_font!(pdf, "Helvetica");

    assert_page_shows!(pdf, 1, "Delivery Slip");
    assert_page_shows!(pdf, 1, "Mr. Ichiro Suzuki");
    assert_page_shows!(pdf, 1, "Purchases of 01/01");
    assert!(!pdf.page_content(2).contains("(Delivery Slip) Tj"));

    let last = pdf.page_count() as u32;
    assert_page_shows!(pdf, last, "Grand total");
    assert_page_shows!(pdf, last, "55,000");
    Ok(())
}

#[test]
fn test_header_row_repeats_on_continuation_pages() -> TestResult {
    let pdf = render_slip(&RenderConfig::default())?;
    for page in 1..=pdf.page_count() as u32 {
        assert_page_shows!(pdf, page, "Amount");
    }
    Ok(())
}

#[test]
fn test_page_numbers_know_the_total() -> TestResult {
    let pdf = render_slip(&RenderConfig::default())?;
    let total = pdf.page_count();
    let forms = form_contents(&pdf.doc);
    assert_eq!(forms.len(), total, "one page number template per page");

    for page in 1..=total {
        let label = format!("({} / {}) Tj", page, total);
        assert!(forms.iter().any(|form| form.contains(&label)), "missing '{}' in {:?}", label, forms);
        assert!(pdf.page_content(page as u32).contains(" Do"));
    }
    Ok(())
}

#[test]
fn test_single_group_fits_one_page() -> TestResult {
    let config = RenderConfig { groups: 1, ..RenderConfig::default() };
    let pdf = render_slip(&config)?;

    assert_pdf_page_count!(pdf, 1);
    assert_eq!(form_contents(&pdf.doc).len(), 1);
    assert!(form_contents(&pdf.doc)[0].contains("(1 / 1) Tj"));
    assert_page_shows!(pdf, 1, "5,500");
    Ok(())
}

#[test]
fn test_landscape_page() -> TestResult {
    let config = RenderConfig { page: PageSetupConfig::A4Landscape, groups: 2, ..RenderConfig::default() };
    let pdf = render_slip(&config)?;
    assert_pdf_page_size!(pdf, 1, A4_HEIGHT_PT, A4_WIDTH_PT);
    Ok(())
}

#[test]
fn test_logo_is_written_once() -> TestResult {
    let pdf = render_slip(&RenderConfig::default())?;
    assert_eq!(count_images(&pdf.doc), 1);
    assert!(resource_names(&pdf.doc, 1, b"XObject").iter().any(|name| name.starts_with("Im")));
    Ok(())
}

#[test]
fn test_larger_font_from_config() -> TestResult {
    let small = render_slip(&RenderConfig::from_json(r#"{ "groups": 4 }"#)?)?;
    let large = render_slip(&RenderConfig::from_json(r#"{ "groups": 4, "context": { "font_size_mm": 6.0 } }"#)?)?;
    assert!(large.page_count() > small.page_count());
    Ok(())
}

#[test]
fn test_missing_logo_file_is_reported() {
    common::init_logger();
    let config = RenderConfig { logo: Some("/nonexistent/logo.png".into()), ..RenderConfig::default() };
    let result = DeliverySlip::sample(1, 1).render(&config, Vec::<u8>::new());
    assert!(matches!(
        result,
        Err(PagewrightError::Layout(LayoutError::Render(RenderError::Resource(_))))
    ));
}

#[test]
fn test_unknown_face_fails_before_writing() {
    common::init_logger();
    let config = RenderConfig::from_json(r#"{ "context": { "font_face": "No Such Face" } }"#).unwrap();
    let result = DeliverySlip::sample(1, 1).render(&config, Vec::<u8>::new());
    assert!(result.is_err());
}
