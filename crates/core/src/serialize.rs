//! Binary wire format for persisted tables.
//!
//! Layout, little-endian throughout:
//!
//! ```text
//! u32 n_infosets
//! per infoset:
//!   u32 key_len ; key bytes (UTF-8)
//!   u32 n_actions
//!   per action:
//!     u32 token_len ; token bytes "<tag>,<amount_bb>"
//!     f64 value
//! ```
//!
//! Action tags are 0=FOLD, 1=CHECK, 2=CALL, 3=BET, 4=RAISE; amounts are
//! written in big blinds and re-quantised to the cent grid on load, so a
//! save/load cycle is cell-wise identity.

use std::io::{Read, Write};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use rustc_hash::FxHashMap;

use crate::error::SolverError;
use crate::game::{chips_to_bb, Action, Chips};

/// One table's rows: info-set key to action values.
pub type TableRows = Vec<(String, FxHashMap<Action, f64>)>;

/// Serialise an action to its wire token.
#[must_use]
pub fn action_token(action: Action) -> String {
    format!("{},{}", action.tag(), chips_to_bb(action.amount()))
}

/// Parse a wire token back into an action.
///
/// # Errors
///
/// Returns `Corrupt` on malformed tokens or unknown tags.
pub fn parse_action_token(token: &str) -> Result<Action, SolverError> {
    let (tag, amount) = token
        .split_once(',')
        .ok_or_else(|| SolverError::Corrupt(format!("bad action token: {token}")))?;
    let tag: u8 = tag
        .parse()
        .map_err(|_| SolverError::Corrupt(format!("bad action tag: {token}")))?;
    let amount: f64 = amount
        .parse()
        .map_err(|_| SolverError::Corrupt(format!("bad action amount: {token}")))?;
    if !(0.0..=f64::from(u32::MAX) / 100.0).contains(&amount) {
        return Err(SolverError::Corrupt(format!("action amount out of range: {token}")));
    }
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let chips = (amount * 100.0).round() as Chips;
    Action::from_tag(tag, chips)
}

/// Write one table in the wire format.
///
/// # Errors
///
/// Propagates I/O failures.
pub fn write_table<W: Write>(writer: &mut W, rows: &TableRows) -> Result<(), SolverError> {
    #[allow(clippy::cast_possible_truncation)]
    writer.write_u32::<LittleEndian>(rows.len() as u32)?;
    for (key, values) in rows {
        write_string(writer, key)?;
        #[allow(clippy::cast_possible_truncation)]
        writer.write_u32::<LittleEndian>(values.len() as u32)?;
        // Deterministic file bytes: order actions by tag then amount.
        let mut actions: Vec<(&Action, &f64)> = values.iter().collect();
        actions.sort_by_key(|(a, _)| (a.tag(), a.amount()));
        for (action, value) in actions {
            write_string(writer, &action_token(*action))?;
            writer.write_f64::<LittleEndian>(*value)?;
        }
    }
    Ok(())
}

/// Read one table in the wire format.
///
/// # Errors
///
/// Returns `Io` on truncated input and `Corrupt` on malformed content.
pub fn read_table<R: Read>(reader: &mut R) -> Result<TableRows, SolverError> {
    let n_infosets = reader.read_u32::<LittleEndian>()?;
    let mut rows = Vec::with_capacity(n_infosets as usize);
    for _ in 0..n_infosets {
        let key = read_string(reader)?;
        let n_actions = reader.read_u32::<LittleEndian>()?;
        let mut values = FxHashMap::default();
        for _ in 0..n_actions {
            let token = read_string(reader)?;
            let action = parse_action_token(&token)?;
            let value = reader.read_f64::<LittleEndian>()?;
            values.insert(action, value);
        }
        rows.push((key, values));
    }
    Ok(rows)
}

fn write_string<W: Write>(writer: &mut W, s: &str) -> Result<(), SolverError> {
    #[allow(clippy::cast_possible_truncation)]
    writer.write_u32::<LittleEndian>(s.len() as u32)?;
    writer.write_all(s.as_bytes())?;
    Ok(())
}

fn read_string<R: Read>(reader: &mut R) -> Result<String, SolverError> {
    let len = reader.read_u32::<LittleEndian>()? as usize;
    // Keys are short; a huge length means a corrupt or truncated file.
    if len > 1 << 20 {
        return Err(SolverError::Corrupt(format!("string length {len} too large")));
    }
    let mut buf = vec![0u8; len];
    reader.read_exact(&mut buf)?;
    String::from_utf8(buf).map_err(|e| SolverError::Corrupt(format!("non-UTF-8 string: {e}")))
}
