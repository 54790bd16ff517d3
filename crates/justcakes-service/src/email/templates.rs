//! Order and quote email templates.
//!
//! Every customer-supplied or provider-supplied string passes through [`escape_html`]
//! before it reaches an HTML body.

use std::fmt::Write;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use justcakes_core::{format_currency, Order, QuoteRequest};

/// Subject and bodies of a rendered message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedEmail {
    /// Subject line.
    pub subject: String,
    /// HTML body.
    pub html: String,
    /// Plain-text body.
    pub text: String,
}

/// Escape text for inclusion in HTML element content or quoted attributes.
#[must_use]
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}

/// Short human reference for an order, the first block of its ID.
#[must_use]
pub fn order_reference(order: &Order) -> String {
    let id = order.id.to_string();
    id.split('-').next().unwrap_or(&id).to_ascii_uppercase()
}

fn money(amount: Decimal, currency: &str) -> String {
    format_currency(amount, currency)
}

fn items_html(order: &Order) -> String {
    let mut rows = String::new();
    for item in &order.order_items {
        let line_total = item.price * Decimal::from(item.quantity);
        let _ = write!(
            rows,
            "<tr><td style=\"padding:8px 0\">{name}</td>\
             <td style=\"padding:8px 0;text-align:center\">{qty}</td>\
             <td style=\"padding:8px 0;text-align:right\">{total}</td></tr>",
            name = escape_html(&item.name),
            qty = item.quantity,
            total = escape_html(&money(line_total, &order.currency)),
        );
    }
    rows
}

fn items_text(order: &Order) -> String {
    let mut lines = String::new();
    for item in &order.order_items {
        let line_total = item.price * Decimal::from(item.quantity);
        let _ = writeln!(
            lines,
            "- {} x{} ({})",
            item.name,
            item.quantity,
            money(line_total, &order.currency)
        );
    }
    lines
}

fn wrap_html(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html><html><head><meta charset=\"utf-8\"><title>{title}</title></head>\
         <body style=\"font-family:-apple-system,BlinkMacSystemFont,'Segoe UI',sans-serif;\
         line-height:1.6;color:#333;max-width:600px;margin:0 auto;padding:20px\">\
         {body}</body></html>",
        title = escape_html(title),
    )
}

/// Confirmation sent to the customer after payment.
#[must_use]
pub fn customer_confirmation(order: &Order) -> RenderedEmail {
    let reference = order_reference(order);
    let subject = format!("Your Just Cakes order {reference} is confirmed");
    let greeting = order.customer_name.as_deref().unwrap_or("there");
    let total = money(order.total_amount, &order.currency);
    let delivery = order
        .delivery_date
        .map(|d| d.format("%A %-d %B %Y").to_string());

    let mut body = format!(
        "<h1 style=\"color:#d14d72\">Thank you for your order!</h1>\
         <p>Hi {greeting},</p>\
         <p>We've received your order <strong>{reference}</strong> and will start baking soon.</p>\
         <table style=\"width:100%;border-collapse:collapse\">\
         <thead><tr><th style=\"text-align:left\">Item</th><th>Qty</th>\
         <th style=\"text-align:right\">Total</th></tr></thead><tbody>{rows}</tbody></table>\
         <p style=\"text-align:right\"><strong>Order total: {total}</strong></p>",
        greeting = escape_html(greeting),
        reference = escape_html(&reference),
        rows = items_html(order),
        total = escape_html(&total),
    );
    if let Some(delivery) = &delivery {
        let _ = write!(
            body,
            "<p>Requested delivery date: <strong>{}</strong></p>",
            escape_html(delivery)
        );
    }
    body.push_str("<p>We'll be in touch if we have any questions.<br>The Just Cakes team</p>");

    let mut text = format!(
        "Thank you for your order!\n\nHi {greeting},\n\n\
         We've received your order {reference} and will start baking soon.\n\n{items}\n\
         Order total: {total}\n",
        items = items_text(order),
    );
    if let Some(delivery) = &delivery {
        let _ = writeln!(text, "Requested delivery date: {delivery}");
    }
    text.push_str("\nThe Just Cakes team\n");

    RenderedEmail {
        html: wrap_html(&subject, &body),
        subject,
        text,
    }
}

/// Alert sent to the business for every new order.
#[must_use]
pub fn business_alert(order: &Order) -> RenderedEmail {
    let reference = order_reference(order);
    let total = money(order.total_amount, &order.currency);
    let subject = format!("New order {reference} - {total}");

    let customer = order.customer_name.as_deref().unwrap_or("(no name)");
    let email = if order.customer_email.is_empty() {
        "(no email)"
    } else {
        order.customer_email.as_str()
    };
    let phone = order.customer_phone.as_deref().unwrap_or("(no phone)");
    let delivery = order
        .delivery_date
        .map_or_else(|| "not specified".to_string(), |d| d.to_string());
    let shipping = order
        .shipping_address
        .as_ref()
        .map_or_else(|| "none".to_string(), serde_json::Value::to_string);

    let body = format!(
        "<h1>New order {reference}</h1>\
         <p><strong>Customer:</strong> {customer}<br>\
         <strong>Email:</strong> {email}<br>\
         <strong>Phone:</strong> {phone}</p>\
         <p><strong>Payment:</strong> {payment}<br>\
         <strong>Delivery date:</strong> {delivery}</p>\
         <table style=\"width:100%;border-collapse:collapse\"><tbody>{rows}</tbody></table>\
         <p><strong>Total:</strong> {total}</p>\
         <p><strong>Shipping:</strong> <code>{shipping}</code></p>\
         <p>Session: <code>{session}</code></p>",
        reference = escape_html(&reference),
        customer = escape_html(customer),
        email = escape_html(email),
        phone = escape_html(phone),
        payment = order.payment_status,
        delivery = escape_html(&delivery),
        rows = items_html(order),
        total = escape_html(&total),
        shipping = escape_html(&shipping),
        session = escape_html(&order.payment_session_id),
    );

    let text = format!(
        "New order {reference}\n\nCustomer: {customer}\nEmail: {email}\nPhone: {phone}\n\
         Payment: {payment}\nDelivery date: {delivery}\n\n{items}\nTotal: {total}\n\
         Shipping: {shipping}\nSession: {session}\n",
        payment = order.payment_status,
        items = items_text(order),
        session = order.payment_session_id,
    );

    RenderedEmail {
        html: wrap_html(&subject, &body),
        subject,
        text,
    }
}

/// Custom quote request forwarded to the business.
#[must_use]
pub fn quote_request(quote: &QuoteRequest, submitted_at: DateTime<Utc>) -> RenderedEmail {
    let occasion = quote.occasion_label();
    let subject = format!("New Custom Cupcake Quote Request - {occasion}");
    let servings = quote.servings.unwrap_or_default();
    let allergies = if quote.allergies.is_empty() {
        "None".to_string()
    } else {
        quote.allergies.join(", ")
    };
    let contact = if quote.contact.trim().is_empty() {
        "(not provided)"
    } else {
        quote.contact.as_str()
    };
    let submitted = submitted_at.format("%A %-d %B %Y %H:%M UTC").to_string();

    let body = format!(
        "<h1 style=\"color:#6A00AA\">New Custom Cupcake Quote Request</h1>\
         <p>You've received a new custom cupcake quote request. Details below:</p>\
         <table style=\"width:100%;border-collapse:collapse\"><tbody>\
         <tr><td><strong>Occasion:</strong></td><td style=\"text-align:right\">{occasion}</td></tr>\
         <tr><td><strong>Servings:</strong></td><td style=\"text-align:right\">{servings}</td></tr>\
         <tr><td><strong>Dietary Restrictions:</strong></td><td style=\"text-align:right\">{allergies}</td></tr>\
         <tr><td><strong>Contact Number:</strong></td><td style=\"text-align:right\">{contact}</td></tr>\
         </tbody></table>\
         <h2 style=\"color:#6A00AA\">Cupcake Description:</h2>\
         <p style=\"white-space:pre-wrap\">{description}</p>\
         <p style=\"color:#999\"><strong>Submitted:</strong> {submitted}</p>",
        occasion = escape_html(occasion),
        allergies = escape_html(&allergies),
        contact = escape_html(contact),
        description = escape_html(quote.description.trim()),
        submitted = escape_html(&submitted),
    );

    let text = format!(
        "NEW CUSTOM CUPCAKE QUOTE REQUEST\n\nOccasion: {occasion}\nServings: {servings}\n\
         Dietary Restrictions: {allergies}\nContact: {contact}\n\nCupcake Description:\n\
         {description}\n\n---\nSubmitted: {submitted}\n",
        description = quote.description.trim(),
    );

    RenderedEmail {
        html: wrap_html(&subject, &body),
        subject,
        text,
    }
}
