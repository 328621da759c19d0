//! Small generated PDFs for tests.

use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, Stream, dictionary};

/// A one-page PDF whose page draws nothing.
pub fn blank_pdf() -> Vec<u8> {
    single_page(Vec::new(), Dictionary::new())
}

/// A one-page PDF with each line drawn in Helvetica, top to bottom.
pub fn text_pdf(lines: &[&str]) -> Vec<u8> {
    let mut operations = vec![
        Operation::new("BT", vec![]),
        Operation::new("Tf", vec!["F1".into(), 12.into()]),
    ];
    for (i, line) in lines.iter().enumerate() {
        let y = 780 - 20 * i as i64;
        operations.push(Operation::new(
            "Tm",
            vec![1.into(), 0.into(), 0.into(), 1.into(), 50.into(), y.into()],
        ));
        operations.push(Operation::new("Tj", vec![Object::string_literal(*line)]));
    }
    operations.push(Operation::new("ET", vec![]));

    let content = Content { operations }.encode().unwrap();
    let font = dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    };
    single_page(content, dictionary! { "F1" => font })
}

fn single_page(content: Vec<u8>, fonts: Dictionary) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let content_id = doc.add_object(Stream::new(dictionary! {}, content));

    let mut page = dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Contents" => content_id,
        "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
    };
    if !fonts.is_empty() {
        let font_ids: Vec<(Vec<u8>, Object)> = fonts
            .into_iter()
            .map(|(name, font)| (name, doc.add_object(font).into()))
            .collect();
        let mut font_refs = Dictionary::new();
        for (name, id) in font_ids {
            font_refs.set(name, id);
        }
        page.set("Resources", dictionary! { "Font" => font_refs });
    }
    let page_id = doc.add_object(page);

    let pages = dictionary! {
        "Type" => "Pages",
        "Kids" => vec![page_id.into()],
        "Count" => 1,
    };
    doc.objects.insert(pages_id, Object::Dictionary(pages));
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut buf = Vec::new();
    doc.save_to(&mut buf).unwrap();
    buf
}
