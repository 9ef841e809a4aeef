//! HTML rendering of the upload page.

use crate::flash::{Flash, FlashKind};
use crate::utils::upload::FILES_FIELD;
use filedrop_core::BatchListing;
use std::fmt::Write;

const STYLE: &str = "body{font-family:sans-serif;max-width:52rem;margin:2rem auto;padding:0 1rem;color:#222}\
h1{font-size:1.4rem}\
.flash{padding:.6rem .8rem;border-radius:4px;margin:1rem 0}\
.flash.success{background:#e6f4ea;color:#1e4620}\
.flash.error{background:#fdecea;color:#611a15}\
.batch{border-top:1px solid #ddd;padding:.6rem 0}\
.batch h2{font-size:1rem;margin:.2rem 0}\
.meta{color:#777;font-size:.85rem}\
ul{margin:.3rem 0;padding-left:1.2rem}\
.size{color:#777;margin-left:.5rem}\
a.delete{color:#b00020;margin-left:.5rem;font-size:.85rem}";

/// Escape text for use in HTML element content and quoted attribute values.
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn download_url(url_prefix: &str, batch_id: &str, file_name: &str) -> String {
    format!(
        "{}/{}/{}",
        url_prefix,
        urlencoding::encode(batch_id),
        urlencoding::encode(file_name)
    )
}

fn delete_url(batch_id: &str, file_name: Option<&str>) -> String {
    match file_name {
        Some(name) => format!(
            "/delete?dir={}&file={}",
            urlencoding::encode(batch_id),
            urlencoding::encode(name)
        ),
        None => format!("/delete?dir={}", urlencoding::encode(batch_id)),
    }
}

fn render_flash(out: &mut String, flash: &Flash) {
    let class = match flash.kind {
        FlashKind::Success => "success",
        FlashKind::Error => "error",
    };
    let _ = write!(
        out,
        "<p class=\"flash {}\" role=\"status\">{}</p>",
        class,
        escape_html(&flash.message)
    );
}

fn render_batch(out: &mut String, batch: &BatchListing, url_prefix: &str) {
    let id = escape_html(&batch.id);
    let modified = batch
        .modified_at
        .map(|t| t.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| "unknown".to_string());

    let _ = write!(
        out,
        "<section class=\"batch\"><h2>{id}<a class=\"delete\" href=\"{}\">delete batch</a></h2>\
         <div class=\"meta\">{} &middot; {} file(s)</div><ul>",
        escape_html(&delete_url(&batch.id, None)),
        modified,
        batch.files.len(),
    );

    for file in &batch.files {
        let _ = write!(
            out,
            "<li><a href=\"{}\">{}</a><span class=\"size\">{}</span>\
             <a class=\"delete\" href=\"{}\">delete</a></li>",
            escape_html(&download_url(url_prefix, &batch.id, &file.name)),
            escape_html(&file.name),
            escape_html(&file.size),
            escape_html(&delete_url(&batch.id, Some(&file.name))),
        );
    }

    out.push_str("</ul></section>");
}

/// Render the whole page: flash message, upload form, batch listing.
pub fn render_home(batches: &[BatchListing], flash: Option<&Flash>, url_prefix: &str) -> String {
    let mut out = String::with_capacity(4096);

    out.push_str("<!DOCTYPE html><html lang=\"en\"><head><meta charset=\"utf-8\">");
    out.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">");
    out.push_str("<title>filedrop</title><style>");
    out.push_str(STYLE);
    out.push_str("</style></head><body><h1>filedrop</h1>");

    if let Some(flash) = flash {
        render_flash(&mut out, flash);
    }

    let _ = write!(
        out,
        "<form method=\"post\" action=\"/\" enctype=\"multipart/form-data\">\
         <input type=\"file\" name=\"{FILES_FIELD}\" multiple> <button type=\"submit\">Upload</button>\
         </form><p class=\"meta\"><a href=\"/logs\">logs</a></p>"
    );

    if batches.is_empty() {
        out.push_str("<p class=\"meta\">No uploads yet.</p>");
    }
    for batch in batches {
        render_batch(&mut out, batch, url_prefix);
    }

    out.push_str("</body></html>");
    out
}
