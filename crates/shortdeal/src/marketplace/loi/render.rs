use std::fmt::Write as _;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use super::domain::{LoiRecord, RenderedDocument};

/// Seam for the document rendering backend. The production deployment
/// plugs a PDF engine in here; the shipped renderer produces the same
/// fixed layout as deterministic plain text so the lifecycle can run and
/// be tested without one.
pub trait LoiRenderer: Send + Sync {
    fn render(
        &self,
        loi: &LoiRecord,
        generated_at: DateTime<Utc>,
    ) -> Result<RenderedDocument, RenderError>;
}

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("renderer unavailable: {0}")]
    Unavailable(String),
}

/// Assembles the letter layout: title, document number, date, parties
/// table, content details, deal terms, agreement statement, footer.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixedLayoutRenderer;

impl LoiRenderer for FixedLayoutRenderer {
    fn render(
        &self,
        loi: &LoiRecord,
        generated_at: DateTime<Utc>,
    ) -> Result<RenderedDocument, RenderError> {
        let mut out = String::new();

        writeln!(out, "LETTER OF INTENT").ok();
        writeln!(out).ok();
        writeln!(out, "Document Number: {}", loi.document_number).ok();
        writeln!(out, "Date: {}", loi.created_at.format("%B %d, %Y")).ok();
        writeln!(out).ok();

        writeln!(out, "PARTIES").ok();
        writeln!(out, "{:<10} {:<30} {}", "Party", "Company", "Country").ok();
        writeln!(
            out,
            "{:<10} {:<30} {}",
            "Buyer", loi.buyer.company, loi.buyer.country
        )
        .ok();
        writeln!(
            out,
            "{:<10} {:<30} {}",
            "Producer", loi.producer.company, loi.producer.country
        )
        .ok();
        writeln!(out).ok();

        writeln!(out, "CONTENT DETAILS").ok();
        writeln!(out, "Title: {}", loi.content_title).ok();
        writeln!(out, "Description:").ok();
        writeln!(out, "{}", loi.content_description).ok();
        writeln!(out).ok();

        writeln!(out, "DEAL TERMS").ok();
        writeln!(
            out,
            "Agreed Price: {} {}",
            loi.currency.code(),
            format_amount(loi.agreed_price)
        )
        .ok();
        writeln!(out).ok();

        writeln!(
            out,
            "This Letter of Intent confirms the mutual interest of the above parties to"
        )
        .ok();
        writeln!(
            out,
            "proceed with the proposed content licensing agreement under the terms outlined"
        )
        .ok();
        writeln!(
            out,
            "above. This document represents a preliminary understanding and is subject to"
        )
        .ok();
        writeln!(out, "the execution of a formal agreement.").ok();
        writeln!(out).ok();

        writeln!(
            out,
            "Generated on {}",
            generated_at.format("%B %d, %Y at %I:%M %p")
        )
        .ok();

        Ok(RenderedDocument {
            content_type: "text/plain; charset=utf-8".to_string(),
            bytes: out.into_bytes(),
        })
    }
}

/// Format an amount with two decimal places and thousands separators,
/// e.g. `12,500.00`.
pub(crate) fn format_amount(amount: Decimal) -> String {
    let rounded = amount.round_dp(2);
    let raw = format!("{rounded:.2}");
    let (integral, fraction) = raw.split_once('.').unwrap_or((raw.as_str(), "00"));
    let (sign, digits) = match integral.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", integral),
    };

    let mut grouped = String::new();
    for (index, ch) in digits.chars().enumerate() {
        let remaining = digits.len() - index;
        if index > 0 && remaining % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    format!("{sign}{grouped}.{fraction}")
}
