//! Text serializer: rendered matrix or document → final text.

use thiserror::Error;

use crate::document::{RenderedDocument, Sample, SeriesTable, TradeRecord};
use crate::encode::{Block, DocValue, EncodeError, Encoder, Encoding};
use crate::options::OutputFormat;
use crate::tabular::RenderedMatrix;

#[derive(Debug, Error)]
pub enum SerializeError {
    #[error("tab-separated write failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("tab-separated buffer: {0}")]
    Buffer(String),

    #[error(transparent)]
    Encode(#[from] EncodeError),

    #[error("{format} output needs a document, got a matrix")]
    FormatMismatch { format: OutputFormat },
}

/// Formatter output, before encoding.
#[derive(Debug, Clone, PartialEq)]
pub enum Rendered {
    Matrix(RenderedMatrix),
    Document(RenderedDocument),
}

/// Encode rendered output in the requested format.
pub fn serialize(rendered: &Rendered, format: OutputFormat) -> Result<String, SerializeError> {
    match (rendered, format) {
        (Rendered::Matrix(matrix), _) if !format.is_document() => to_tsv(matrix),
        (Rendered::Document(doc), OutputFormat::Json5) => to_text(doc, Encoding::Loose),
        (Rendered::Document(doc), OutputFormat::Json) => to_text(doc, Encoding::Strict),
        // A document requested as TSV is written loose.
        (Rendered::Document(doc), OutputFormat::Tsv) => to_text(doc, Encoding::Loose),
        (Rendered::Matrix(_), format) => Err(SerializeError::FormatMismatch { format }),
    }
}

/// Cells joined by tabs, rows by newlines, with a trailing newline.
pub fn to_tsv(matrix: &RenderedMatrix) -> Result<String, SerializeError> {
    let mut wtr = csv::WriterBuilder::new()
        .delimiter(b'\t')
        .quote_style(csv::QuoteStyle::Never)
        .terminator(csv::Terminator::Any(b'\n'))
        .flexible(true)
        .from_writer(Vec::new());
    for row in &matrix.rows {
        wtr.write_record(row)?;
    }
    let bytes = wtr
        .into_inner()
        .map_err(|e| SerializeError::Buffer(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| SerializeError::Buffer(e.to_string()))
}

/// Encode a document in either structured mode.
pub fn to_text(doc: &RenderedDocument, encoding: Encoding) -> Result<String, SerializeError> {
    Ok(Encoder::new(encoding).document(&blocks(doc))?)
}

fn blocks(doc: &RenderedDocument) -> Vec<(&'static str, Block)> {
    let mut blocks = vec![
        ("v", Block::Scalar(DocValue::Str(doc.version.clone()))),
        (
            "bots",
            Block::Entries(
                doc.entities
                    .iter()
                    .map(|(name, summary)| {
                        let mut fields = vec![("id".to_string(), DocValue::Str(summary.id.clone()))];
                        fields.extend(
                            summary
                                .fields
                                .iter()
                                .map(|(k, v)| (k.clone(), DocValue::Number(*v))),
                        );
                        (name.clone(), DocValue::Map(fields))
                    })
                    .collect(),
            ),
        ),
    ];
    if let Some(days) = &doc.axis {
        blocks.push((
            "days",
            Block::Line(days.iter().map(|d| DocValue::Number(*d as f64)).collect()),
        ));
    }
    if let Some(quotes) = &doc.quotes {
        blocks.push(("quotes", series(quotes)));
    }
    if let Some(factors) = &doc.factors {
        blocks.push(("factors", series(factors)));
    }
    if let Some(trades) = &doc.trades {
        blocks.push(("trades", Block::Rows(trades.iter().map(trade).collect())));
    }
    blocks
}

fn series(table: &SeriesTable) -> Block {
    Block::Entries(
        table
            .rows
            .iter()
            .map(|(key, samples)| {
                let values = samples
                    .iter()
                    .map(|s| match s {
                        Sample::Value(v) => DocValue::Number(*v),
                        Sample::Blank => DocValue::Blank,
                    })
                    .collect();
                (key.clone(), DocValue::List(values))
            })
            .collect(),
    )
}

fn trade(t: &TradeRecord) -> DocValue {
    let mut row = vec![
        DocValue::Str(t.key.clone()),
        DocValue::Label(t.entity.clone()),
        DocValue::Str(t.instrument.clone()),
        DocValue::Number(t.exposure),
    ];
    if let Some(perf) = t.perf {
        row.push(DocValue::Number(perf));
    }
    DocValue::List(row)
}
