//! Invoice documents.
//!
//! [`PdfInvoiceRenderer`] lays the invoice out as positioned text runs and builds the
//! document with `lopdf`, using the standard Helvetica fonts so no font files are embedded.
//! The line table flows onto as many A4 pages as it needs, repeating its header row on each
//! page.

use anyhow::Context;
use lopdf::{
    Dictionary, Document, Object, ObjectId, Stream, StringFormat,
    content::{Content, Operation},
    dictionary,
};
use rust_decimal::Decimal;

use crate::domain::{OrderId, cart::pricing::display};

#[derive(Debug, Clone, PartialEq)]
pub struct InvoiceRecord {
    pub order_id: OrderId,
    pub username: String,
    pub lines: Vec<InvoiceLine>,
    pub grand_total: Decimal,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InvoiceLine {
    pub product_name: String,
    pub quantity: i32,
    pub subtotal: Decimal,
}

pub trait InvoiceRenderer: Send + Sync {
    fn render(&self, invoice: &InvoiceRecord) -> Result<Vec<u8>, anyhow::Error>;
}

const PAGE_WIDTH: f32 = 595.28;
const PAGE_HEIGHT: f32 = 841.89;
const CM: f32 = 28.3465;
const MARGIN: f32 = 2.0 * CM;
const ROW_HEIGHT: f32 = 0.6 * CM;
const PRODUCT_X: f32 = 2.0 * CM;
const QUANTITY_X: f32 = 10.0 * CM;
const TOTAL_X: f32 = 14.0 * CM;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Font {
    Regular,
    Bold,
}

impl Font {
    fn resource(self) -> &'static str {
        match self {
            Font::Regular => "F1",
            Font::Bold => "F2",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
struct TextRun {
    font: Font,
    size: f32,
    x: f32,
    y: f32,
    text: String,
}

/// Places text top-down, starting a new page when the bottom margin is reached.
struct Layout {
    pages: Vec<Vec<TextRun>>,
    y: f32,
}

impl Layout {
    fn new() -> Self {
        Self {
            pages: vec![Vec::new()],
            y: PAGE_HEIGHT - MARGIN,
        }
    }

    fn text(&mut self, font: Font, size: f32, x: f32, text: impl Into<String>) {
        if let Some(page) = self.pages.last_mut() {
            page.push(TextRun {
                font,
                size,
                x,
                y: self.y,
                text: text.into(),
            });
        }
    }

    fn advance(&mut self, distance: f32) {
        self.y -= distance;
    }

    fn fits(&self, distance: f32) -> bool {
        self.y - distance >= MARGIN
    }

    fn new_page(&mut self) {
        self.pages.push(Vec::new());
        self.y = PAGE_HEIGHT - MARGIN;
    }

    fn table_header(&mut self) {
        self.text(Font::Bold, 12.0, PRODUCT_X, "Product");
        self.text(Font::Bold, 12.0, QUANTITY_X, "Quantity");
        self.text(Font::Bold, 12.0, TOTAL_X, "Total");
        self.advance(0.8 * CM);
    }
}

fn layout(invoice: &InvoiceRecord) -> Vec<Vec<TextRun>> {
    let mut layout = Layout::new();

    layout.text(
        Font::Bold,
        20.0,
        MARGIN,
        format!("Invoice - Order #{}", invoice.order_id),
    );
    layout.advance(1.5 * CM);
    layout.text(Font::Bold, 14.0, MARGIN, "Customer");
    layout.advance(0.8 * CM);
    layout.text(Font::Regular, 12.0, MARGIN, format!("Name: {}", invoice.username));
    layout.advance(1.2 * CM);
    layout.text(Font::Bold, 14.0, MARGIN, "Order details");
    layout.advance(1.0 * CM);
    layout.table_header();

    for line in &invoice.lines {
        if !layout.fits(ROW_HEIGHT) {
            layout.new_page();
            layout.table_header();
        }
        layout.text(Font::Regular, 12.0, PRODUCT_X, line.product_name.clone());
        layout.text(Font::Regular, 12.0, QUANTITY_X, line.quantity.to_string());
        layout.text(Font::Regular, 12.0, TOTAL_X, display(line.subtotal).to_string());
        layout.advance(ROW_HEIGHT);
    }

    if !layout.fits(1.0 * CM) {
        layout.new_page();
    } else {
        layout.advance(1.0 * CM);
    }
    layout.text(
        Font::Bold,
        14.0,
        MARGIN,
        format!("Total: {}", display(invoice.grand_total)),
    );

    layout.pages
}

/// WinAnsi bytes for the standard fonts. Characters the encoding lacks become `?`.
fn win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c {
            '€' => 0x80,
            '‚' => 0x82,
            '„' => 0x84,
            '…' => 0x85,
            '‘' => 0x91,
            '’' => 0x92,
            '“' => 0x93,
            '”' => 0x94,
            '•' => 0x95,
            '–' => 0x96,
            '—' => 0x97,
            '™' => 0x99,
            ' '..='~' | '\u{a0}'..='\u{ff}' => c as u32 as u8,
            _ => b'?',
        })
        .collect()
}

fn content_stream(runs: &[TextRun]) -> Result<Vec<u8>, anyhow::Error> {
    let operations: Vec<Operation> = runs
        .iter()
        .flat_map(|run| {
            [
                Operation::new("BT", vec![]),
                Operation::new(
                    "Tf",
                    vec![run.font.resource().into(), Object::Real(run.size)],
                ),
                Operation::new("Td", vec![Object::Real(run.x), Object::Real(run.y)]),
                Operation::new(
                    "Tj",
                    vec![Object::String(win_ansi(&run.text), StringFormat::Literal)],
                ),
                Operation::new("ET", vec![]),
            ]
        })
        .collect();

    Content { operations }
        .encode()
        .context("Could not encode invoice page content.")
}

fn standard_font(base_font: &str) -> Object {
    Object::Dictionary(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => base_font,
        "Encoding" => "WinAnsiEncoding",
    })
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PdfInvoiceRenderer;

impl InvoiceRenderer for PdfInvoiceRenderer {
    fn render(&self, invoice: &InvoiceRecord) -> Result<Vec<u8>, anyhow::Error> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let regular_id = doc.add_object(standard_font("Helvetica"));
        let bold_id = doc.add_object(standard_font("Helvetica-Bold"));
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! {
                Font::Regular.resource() => regular_id,
                Font::Bold.resource() => bold_id,
            },
        });

        let mut kids: Vec<ObjectId> = Vec::new();
        for runs in layout(invoice) {
            let content_id = doc.add_object(Stream::new(Dictionary::new(), content_stream(&runs)?));
            kids.push(doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
            }));
        }

        let page_count = kids.len() as i64;
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids.into_iter().map(Object::Reference).collect::<Vec<_>>(),
                "Count" => page_count,
                "Resources" => resources_id,
                "MediaBox" => vec![
                    Object::Integer(0),
                    Object::Integer(0),
                    Object::Real(PAGE_WIDTH),
                    Object::Real(PAGE_HEIGHT),
                ],
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut bytes = Vec::new();
        doc.save_to(&mut bytes)
            .context("Could not write invoice document.")?;
        Ok(bytes)
    }
}
