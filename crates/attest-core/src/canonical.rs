//! Canonical event encoding and chain digest.
//!
//! This is the single shared implementation of the hash contract. Every
//! component that computes or verifies an event hash (the append engine,
//! both verifiers, any store-side recomputation) must go through this
//! module. Duplicating the formatting logic elsewhere is how integrity
//! false-positives happen.
//!
//! The contract, version 1:
//! - fixed field order: `seq, org_id, actor_id, event, target_type,
//!   target_id, created_at, metadata`
//! - 2-space-indented rendering with one key per line
//! - absent `actor_id` / `target_id` become the empty string, never omitted
//! - `metadata` is rendered with sorted keys (serde_json's `BTreeMap`-backed
//!   map) and is `{}` when empty, never `null`
//! - digest: lowercase-hex SHA-256 over `encoding ‖ prev_hash ‖ salt`
//!
//! Field order and whitespace are part of the contract. Any change must bump
//! [`ENCODING_VERSION`] and invalidates every previously computed hash.

use serde_json::Value;
use sha2::{Digest, Sha256};

/// Version of the canonical encoding format.
pub const ENCODING_VERSION: u32 = 1;

/// The hashable content of a ledger event.
///
/// Exactly the fields that are hash inputs; classification fields
/// (`severity`, `category`, `outcome`) and any display-only enrichment are
/// deliberately absent.
#[derive(Debug, Clone, Copy)]
pub struct EventContent<'a> {
    pub seq: i64,
    pub org_id: &'a str,
    pub actor_id: Option<&'a str>,
    pub event_name: &'a str,
    pub target_type: &'a str,
    pub target_id: Option<&'a str>,
    /// RFC 3339 timestamp, in the exact string form stored in the database.
    pub created_at: &'a str,
    pub metadata: &'a Value,
}

/// Produce the canonical byte representation of an event's content.
///
/// Deterministic: the same content always yields the same bytes, across
/// processes and restarts. The output is not yet hashed; see [`chain_hash`].
#[must_use]
pub fn encode(content: &EventContent<'_>) -> String {
    let mut out = String::with_capacity(256);
    out.push_str("{\n");

    out.push_str("  \"seq\": ");
    out.push_str(&content.seq.to_string());
    out.push_str(",\n");

    render_field(&mut out, "org_id", content.org_id);
    render_field(&mut out, "actor_id", content.actor_id.unwrap_or(""));
    render_field(&mut out, "event", content.event_name);
    render_field(&mut out, "target_type", content.target_type);
    render_field(&mut out, "target_id", content.target_id.unwrap_or(""));
    render_field(&mut out, "created_at", content.created_at);

    out.push_str("  \"metadata\": ");
    // Null metadata is an encoding error upstream; render it as the empty
    // document so the contract never emits a bare `null` here.
    if content.metadata.is_null() {
        out.push_str("{}");
    } else {
        render_value(&mut out, content.metadata, 1);
    }
    out.push_str("\n}");

    out
}

/// Compute the chain hash for an event: SHA-256 over the canonical encoding,
/// the predecessor's hash, and the shared secret salt, hex-encoded lowercase.
///
/// `prev_hash` is the empty string for the first event of an organization.
#[must_use]
pub fn chain_hash(content: &EventContent<'_>, prev_hash: &str, salt: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(encode(content).as_bytes());
    hasher.update(prev_hash.as_bytes());
    hasher.update(salt.as_bytes());
    hex::encode(hasher.finalize())
}

fn render_field(out: &mut String, key: &str, value: &str) {
    out.push_str("  \"");
    out.push_str(key);
    out.push_str("\": ");
    render_string(out, value);
    out.push_str(",\n");
}

/// Render a JSON value with 2-space indentation, matching serde_json's
/// pretty formatting byte-for-byte. Object keys iterate in sorted order
/// (serde_json's default `Map` is backed by `BTreeMap`).
fn render_value(out: &mut String, value: &Value, indent: usize) {
    match value {
        Value::Null => out.push_str("null"),
        Value::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
        Value::Number(n) => out.push_str(&n.to_string()),
        Value::String(s) => render_string(out, s),
        Value::Array(items) => {
            if items.is_empty() {
                out.push_str("[]");
                return;
            }
            out.push_str("[\n");
            for (i, item) in items.iter().enumerate() {
                push_indent(out, indent + 1);
                render_value(out, item, indent + 1);
                if i + 1 < items.len() {
                    out.push(',');
                }
                out.push('\n');
            }
            push_indent(out, indent);
            out.push(']');
        }
        Value::Object(map) => {
            if map.is_empty() {
                out.push_str("{}");
                return;
            }
            out.push_str("{\n");
            for (i, (key, val)) in map.iter().enumerate() {
                push_indent(out, indent + 1);
                render_string(out, key);
                out.push_str(": ");
                render_value(out, val, indent + 1);
                if i + 1 < map.len() {
                    out.push(',');
                }
                out.push('\n');
            }
            push_indent(out, indent);
            out.push('}');
        }
    }
}

fn push_indent(out: &mut String, indent: usize) {
    for _ in 0..indent {
        out.push_str("  ");
    }
}

/// Escape and quote a string exactly as serde_json does.
fn render_string(out: &mut String, s: &str) {
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\u{08}' => out.push_str("\\b"),
            '\u{09}' => out.push_str("\\t"),
            '\u{0A}' => out.push_str("\\n"),
            '\u{0C}' => out.push_str("\\f"),
            '\u{0D}' => out.push_str("\\r"),
            c if (c as u32) < 0x20 => {
                out.push_str(&format!("\\u{:04x}", c as u32));
            }
            c => out.push(c),
        }
    }
    out.push('"');
}
