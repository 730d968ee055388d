//! # Address Display
//!
//! Template selection and rendering of addresses into display text.
//!
//! ## Template Format
//! Templates are line oriented. Each line may reference address fields with
//! `{{field}}` placeholders (see [`Address::template_context`]):
//!
//! ```text
//! {{address_line1}}
//! {{address_line2}}
//! {{city}}
//! Phone: {{phone}}
//! ```
//!
//! A line whose placeholders all resolve to empty values is dropped, so
//! `Phone: {{phone}}` disappears for an address without a phone number.
//! Every kept line is terminated with `<br>`.
//!
//! ## Template Selection
//! ```text
//! address.country ──► template for that country?  ── yes ──► use it
//!                              │ no
//!                              ▼
//!                     template marked default?      ── yes ──► use it
//!                              │ no
//!                              ▼
//!                     DEFAULT_TEMPLATE (built in)
//! ```

use std::collections::HashMap;

use text_placeholder::Template;

use crate::error::ValidationError;
use crate::types::{Address, AddressTemplate};

/// Built-in layout used when no template is configured.
pub const DEFAULT_TEMPLATE: &str = "{{address_line1}}
{{address_line2}}
{{city}}
{{state}}
{{pincode}}
{{country}}
Phone: {{phone}}
Fax: {{fax}}
Email: {{email_id}}";

/// Name reported for the built-in template.
pub const DEFAULT_TEMPLATE_NAME: &str = "Default";

const LINE_BREAK: &str = "<br>";

/// Picks the template for an address.
///
/// Returns the template's name (its country, or [`DEFAULT_TEMPLATE_NAME`]) and
/// its text.
pub fn select_template<'a>(
    templates: &'a [AddressTemplate],
    address: &Address,
) -> (&'a str, &'a str) {
    templates
        .iter()
        .find(|t| t.country.eq_ignore_ascii_case(address.country.trim()))
        .or_else(|| templates.iter().find(|t| t.is_default))
        .map(|t| (t.country.as_str(), t.template.as_str()))
        .unwrap_or((DEFAULT_TEMPLATE_NAME, DEFAULT_TEMPLATE))
}

/// Renders an address through a template.
///
/// ## Example
/// ```rust
/// use address_core::display::render_address;
/// use address_core::types::Address;
///
/// let address = Address::new("Acme", "1 Main St", "Springfield", "United States");
/// let text = render_address("{{address_line1}}\n{{state}}\n{{city}}", &address);
/// assert_eq!(text, "1 Main St<br>Springfield<br>");
/// ```
pub fn render_address(template: &str, address: &Address) -> String {
    let context = address.template_context();
    let values: HashMap<&str, &str> = context.iter().map(|(k, v)| (*k, v.as_str())).collect();

    let mut out = String::new();
    for line in template.lines() {
        let line = normalize_placeholders(line);
        let names = placeholders(&line);

        let all_empty = !names.is_empty()
            && names
                .iter()
                .all(|n| values.get(n).map_or(true, |v| v.trim().is_empty()));
        if all_empty {
            continue;
        }

        let rendered = Template::new(&line).fill_with_hashmap(&values);
        if rendered.trim().is_empty() {
            continue;
        }

        out.push_str(rendered.trim_end());
        out.push_str(LINE_BREAK);
    }

    out
}

/// Checks that every `{{` in a template is closed on the same line and names
/// a field.
///
/// [`render_address`] copies malformed placeholders through as literal text,
/// so templates are checked before they are stored.
///
/// ## Example
/// ```rust
/// use address_core::display::check_template;
///
/// assert!(check_template("{{city}}, {{ pincode }}").is_ok());
/// assert!(check_template("Ship {{city").is_err());
/// ```
pub fn check_template(template: &str) -> Result<(), ValidationError> {
    let invalid = |line: usize, reason: &str| ValidationError::InvalidFormat {
        field: "template".to_string(),
        reason: format!("line {}: {}", line, reason),
    };

    for (i, line) in template.lines().enumerate() {
        let mut rest = line;
        while let Some(start) = rest.find("{{") {
            let after = &rest[start + 2..];
            let end = after
                .find("}}")
                .ok_or_else(|| invalid(i + 1, "unclosed '{{'"))?;
            if after[..end].trim().is_empty() {
                return Err(invalid(i + 1, "empty placeholder"));
            }
            rest = &after[end + 2..];
        }
    }

    Ok(())
}

/// Renders an address with the best template from `templates`.
pub fn address_display(templates: &[AddressTemplate], address: &Address) -> String {
    let (_, template) = select_template(templates, address);
    render_address(template, address)
}

/// Names of the `{{...}}` placeholders in a line, in order.
fn placeholders(line: &str) -> Vec<&str> {
    let mut names = Vec::new();
    let mut rest = line;

    while let Some(start) = rest.find("{{") {
        let after = &rest[start + 2..];
        match after.find("}}") {
            Some(end) => {
                names.push(after[..end].trim());
                rest = &after[end + 2..];
            }
            None => break,
        }
    }

    names
}

/// Rewrites `{{ field }}` as `{{field}}`.
fn normalize_placeholders(line: &str) -> String {
    let mut out = String::with_capacity(line.len());
    let mut rest = line;

    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        match after.find("}}") {
            Some(end) => {
                out.push_str("{{");
                out.push_str(after[..end].trim());
                out.push_str("}}");
                rest = &after[end + 2..];
            }
            None => {
                out.push_str(&rest[start..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);

    out
}
