//! Printable invoice rendering.
//!
//! The invoice is a standalone HTML page that opens the print dialog when
//! loaded. Every interpolated value is escaped.

use std::fmt;

use marble_core::{
  pricing::{format_money, format_sqft},
  sale::Sale,
};
use serde::Deserialize;

const DEFAULT_NOTES: &str = "Thank you for your business!";

const STYLE: &str = "\
body { font-family: Arial, sans-serif; margin: 40px; }
.invoice-header { display: flex; justify-content: space-between; border-bottom: 2px solid #000; padding-bottom: 20px; margin-bottom: 20px; }
.company-name { font-size: 28px; font-weight: bold; color: #2c3e50; }
.details { display: flex; justify-content: space-between; margin: 20px 0; }
table { width: 100%; border-collapse: collapse; margin: 20px 0; }
th { background-color: #f8f9fa; text-align: left; padding: 10px; border: 1px solid #dee2e6; }
td { padding: 10px; border: 1px solid #dee2e6; }
.total-row { font-weight: bold; background-color: #f8f9fa; }
.footer { display: flex; justify-content: space-between; margin-top: 40px; padding-top: 20px; border-top: 2px solid #000; }
.signature { width: 30%; text-align: center; border-top: 1px solid #000; padding-top: 8px; margin-top: 60px; }
.text-end { text-align: right; }
";

/// Letterhead printed at the top of every invoice.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Company {
  pub name:    String,
  pub address: String,
  pub phone:   String,
  pub email:   String,
}

impl Default for Company {
  fn default() -> Self {
    Self {
      name:    "Marble Masters".into(),
      address: "123 Stone Street, Marble City".into(),
      phone:   "(042) 123-4567".into(),
      email:   "info@marblemasters.com".into(),
    }
  }
}

/// Escape text for use in HTML element content and attribute values.
pub fn escape_html(s: &str) -> String {
  let mut out = String::with_capacity(s.len());
  for c in s.chars() {
    match c {
      '&' => out.push_str("&amp;"),
      '<' => out.push_str("&lt;"),
      '>' => out.push_str("&gt;"),
      '"' => out.push_str("&quot;"),
      '\'' => out.push_str("&#39;"),
      c => out.push(c),
    }
  }
  out
}

/// A sale laid out as a printable invoice. `address` is the customer's
/// address when one is on file.
pub struct Invoice<'a> {
  pub sale:    &'a Sale,
  pub company: &'a Company,
  pub address: Option<&'a str>,
}

impl fmt::Display for Invoice<'_> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let e = escape_html;
    let (sale, company) = (self.sale, self.company);

    write!(
      f,
      "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n\
       <title>Invoice {invoice}</title>\n<style>\n{STYLE}</style>\n</head>\n<body>\n",
      invoice = e(sale.invoice_number.as_str()),
    )?;

    write!(
      f,
      "<div class=\"invoice-header\">\n<div>\n\
       <div class=\"company-name\">{name}</div>\n\
       <p>{address}</p>\n<p>Phone: {phone}</p>\n<p>Email: {email}</p>\n</div>\n\
       <div class=\"text-end\">\n<h2>INVOICE</h2>\n\
       <p><strong>Invoice #:</strong> {invoice}</p>\n\
       <p><strong>Date:</strong> {date}</p>\n</div>\n</div>\n",
      name = e(&company.name),
      address = e(&company.address),
      phone = e(&company.phone),
      email = e(&company.email),
      invoice = e(sale.invoice_number.as_str()),
      date = sale.created_at.format("%B %-d, %Y"),
    )?;

    write!(
      f,
      "<div class=\"details\">\n<div>\n<h4>Bill To:</h4>\n\
       <p><strong>{customer}</strong></p>\n<p>Phone: {phone}</p>\n",
      customer = e(&sale.customer_name),
      phone = e(sale.customer_phone.as_deref().unwrap_or("N/A")),
    )?;
    if let Some(address) = self.address.map(str::trim).filter(|a| !a.is_empty()) {
      writeln!(f, "<p>{}</p>", e(address))?;
    }
    f.write_str(
      "</div>\n<div class=\"text-end\">\n<h4>Payment Details</h4>\n\
       <p><strong>Status:</strong> Paid</p>\n\
       <p><strong>Payment Method:</strong> Cash</p>\n</div>\n</div>\n",
    )?;

    write!(
      f,
      "<table>\n<thead>\n<tr><th>#</th><th>Description</th><th>Dimensions</th>\
       <th>Quantity</th><th>Rate (sq.ft)</th><th>Amount (PKR)</th></tr>\n</thead>\n<tbody>\n\
       <tr><td>1</td><td><strong>{item}</strong><br>{kind}</td><td>{dims}</td>\
       <td>{qty}</td><td>{rate}</td><td>{amount}</td></tr>\n",
      item = e(&sale.item_name),
      kind = e(sale.marble_type.as_str()),
      dims = e(&sale.dimensions),
      qty = format_sqft(sale.quantity),
      rate = format_money(sale.sale_price),
      amount = format_money(sale.total_amount),
    )?;
    let cement = sale.cement_info.trim();
    if !cement.is_empty() {
      writeln!(f, "<tr><td>2</td><td colspan=\"4\">{}</td><td>Included</td></tr>", e(cement))?;
    }
    write!(
      f,
      "<tr class=\"total-row\"><td colspan=\"5\" class=\"text-end\">Total Amount:</td>\
       <td>{}</td></tr>\n</tbody>\n</table>\n",
      format_money(sale.total_amount),
    )?;

    let remarks = sale.remarks.trim();
    let notes = if remarks.is_empty() { DEFAULT_NOTES } else { remarks };
    write!(
      f,
      "<div>\n<h4>Notes:</h4>\n<p>{}</p>\n</div>\n\
       <div class=\"footer\">\n\
       <div class=\"signature\">Customer Signature</div>\n\
       <div class=\"signature\">Sales Representative</div>\n\
       <div class=\"signature\">Company Stamp</div>\n</div>\n",
      e(notes),
    )?;

    f.write_str(
      "<script>\nwindow.onload = function() { window.print(); }\n</script>\n</body>\n</html>\n",
    )
  }
}

/// Render `sale` as a printable invoice document.
pub fn render_invoice(sale: &Sale, company: &Company, address: Option<&str>) -> String {
  Invoice { sale, company, address }.to_string()
}
