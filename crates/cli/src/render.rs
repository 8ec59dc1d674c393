//! Terminal rendering

use std::{io, time::Duration};

use humanize_duration::{Truncate, prelude::DurationExt};
use jiff::Timestamp;
use tabled::{
    builder::Builder,
    settings::{
        Alignment, Style,
        object::{Columns, Rows},
    },
};

use bazaar::discounts::{flash::FlashOffer, percent_points};
use bazaar_app::page::{CartView, CheckoutSummary, DiscountInput, Notification, NotificationLevel};

pub fn write_notification(out: &mut impl io::Write, notification: &Notification) -> io::Result<()> {
    let marker = match notification.level {
        NotificationLevel::Success => "✓",
        NotificationLevel::Warning => "!",
        NotificationLevel::Error => "✗",
    };

    writeln!(out, "{marker} {}", notification.message)
}

pub fn write_cart(out: &mut impl io::Write, view: &CartView) -> io::Result<()> {
    if view.is_empty() {
        return writeln!(out, "Your cart is empty");
    }

    let mut builder = Builder::default();

    builder.push_record(["Item", "Unit price", "Qty", "Max", "Line total"]);

    for line in &view.lines {
        let unit_price = if line.on_sale {
            format!("{} (sale)", line.unit_price)
        } else {
            line.unit_price.to_string()
        };

        builder.push_record([
            line.title.clone(),
            unit_price,
            line.quantity.to_string(),
            line.max_quantity.to_string(),
            line.line_total
                .map_or_else(|| "-".to_string(), |total| total.to_string()),
        ]);
    }

    let mut table = builder.build();

    table.with(Style::modern_rounded());
    table.modify(Columns::new(1..), Alignment::right());
    table.modify(Rows::first(), Alignment::center());

    writeln!(out, "{table}")?;

    let totals = &view.totals;

    writeln!(out, " Subtotal: {}", totals.items_price)?;
    writeln!(out, " Shipping: {}", totals.shipping_price)?;

    if let Some(label) = &view.discount_label {
        writeln!(out, " {label}: -{}", totals.discount)?;
    }

    writeln!(out, " Total:    {}", totals.total)?;
    writeln!(out)?;
    writeln!(out, " Coupon:   {}", describe_input(&view.coupon))?;
    writeln!(out, " Referral: {}", describe_input(&view.referral))
}

fn describe_input(input: &DiscountInput) -> String {
    match input {
        DiscountInput::Available => "available".to_string(),
        DiscountInput::Applied(code) => format!("applied ({code})"),
        DiscountInput::Blocked(active) => format!("unavailable while a {active} is active"),
    }
}

pub fn write_offer(
    out: &mut impl io::Write,
    offer: Option<&FlashOffer>,
    now: Timestamp,
) -> io::Result<()> {
    let Some(offer) = offer else {
        return writeln!(out, "No flash offer is running");
    };

    let percent = percent_points(offer.percent).normalize();

    write!(out, "{}: {percent}% off", offer.title)?;

    if let Some(cap) = offer.max_discount {
        write!(out, " (up to {cap})")?;
    }

    let remaining = offer
        .remaining_at(now)
        .and_then(|remaining| Duration::try_from(remaining).ok());

    match remaining {
        Some(remaining) if offer.is_live_at(now) => {
            writeln!(out, ", ends in {}", remaining.human(Truncate::Second))
        }
        Some(_) => writeln!(out, ", not started yet"),
        None => writeln!(out, ", ended"),
    }
}

pub fn write_checkout(out: &mut impl io::Write, summary: &CheckoutSummary) -> io::Result<()> {
    let units: u32 = summary.items.iter().map(|item| item.quantity).sum();

    writeln!(out, "Ready to check out {units} unit(s)")?;

    if let Some(code) = &summary.applied_code {
        writeln!(out, " Code:     {code}")?;
    }

    writeln!(out, " Discount: {}", summary.totals.discount)?;
    writeln!(out, " Total:    {}", summary.totals.total)
}
