//! Offline batch re-encryption of stored values into the current format.
//!
//! [`run`] scans every row a [`RowStore`] yields, decodes each encrypted
//! column through the codec, and rewrites any column that is not already in
//! the current format. A second run over migrated data finds nothing to do.
//! With [`MigrateOptions::force`] current values are re-encrypted as well;
//! the new blobs differ (fresh nonces) but decrypt to the same plaintext.
//!
//! A value that carries the version marker but does not open under the
//! codec's key ([`Format::Undecryptable`]) is never rewritten, even when
//! forced: it is ciphertext under some other key, and wrapping it again would
//! make it unrecoverable. Such values are counted in
//! [`MigrationReport::fields_undecryptable`].
//!
//! Migration is batch-only. Reads never write back.

pub mod store;

pub use store::{MemoryStore, RowStore};

use std::collections::HashMap;

use common::Row;
use tracing::{info, warn};

use crate::codec::{FieldCodec, Format};
use crate::error::Error;

/// Knobs for a migration run.
#[derive(Debug, Clone, Copy, Default)]
pub struct MigrateOptions {
    /// Re-encrypt values that are already in the current format.
    pub force: bool,
    /// Count what would change without writing anything.
    pub dry_run: bool,
}

/// Counters collected during a migration run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MigrationReport {
    /// Rows read from the store.
    pub rows_scanned: usize,
    /// Rows written back (or that would be, in a dry run).
    pub rows_updated: usize,
    /// Rows whose write-back failed.
    pub rows_failed: usize,
    /// Columns left alone because they were already current.
    pub fields_current: usize,
    /// Columns re-encrypted.
    pub fields_reencrypted: usize,
    /// Columns skipped because they did not open under the codec's key.
    pub fields_undecryptable: usize,
    /// How many columns matched each stored format.
    pub formats: HashMap<Format, usize>,
}

/// Re-encrypt every non-current column in `store`.
///
/// A failed write of one row is logged and counted, then the scan continues.
///
/// # Errors
///
/// Returns [`Error::Store`] if the rows cannot be listed and [`Error::Cipher`]
/// if encryption fails; either aborts the run.
pub fn run<S>(
    codec: &FieldCodec,
    store: &mut S,
    opts: MigrateOptions,
) -> Result<MigrationReport, Error>
where
    S: RowStore + ?Sized,
{
    let rows = store.rows()?;
    info!(
        rows = rows.len(),
        force = opts.force,
        dry_run = opts.dry_run,
        "re-encryption started"
    );

    let mut report = MigrationReport::default();
    for mut row in rows {
        report.rows_scanned += 1;
        if reencrypt_row(codec, &mut row, opts.force, &mut report)? == 0 {
            continue;
        }
        if opts.dry_run {
            report.rows_updated += 1;
            continue;
        }
        match store.update(&row) {
            Ok(()) => report.rows_updated += 1,
            Err(e) => {
                warn!(
                    table = %row.table(),
                    id = row.id(),
                    error = %e,
                    "failed to write re-encrypted row"
                );
                report.rows_failed += 1;
            }
        }
    }

    info!(
        scanned = report.rows_scanned,
        updated = report.rows_updated,
        failed = report.rows_failed,
        fields_reencrypted = report.fields_reencrypted,
        fields_current = report.fields_current,
        fields_undecryptable = report.fields_undecryptable,
        "re-encryption finished"
    );
    Ok(report)
}

/// Re-encrypt the columns of `row` in place; returns how many changed.
fn reencrypt_row(
    codec: &FieldCodec,
    row: &mut Row,
    force: bool,
    report: &mut MigrationReport,
) -> Result<usize, Error> {
    let (table, id) = (row.table(), row.id().to_owned());
    let mut changed = 0;
    for (column, value) in row.encrypted_columns_mut() {
        let decoded = codec.inspect(value);
        *report.formats.entry(decoded.format).or_default() += 1;
        if decoded.format == Format::Undecryptable {
            warn!(
                table = %table,
                id = %id,
                column,
                "column does not open under the configured key; left unchanged"
            );
            report.fields_undecryptable += 1;
            continue;
        }
        if decoded.format.is_current() && !force {
            report.fields_current += 1;
            continue;
        }
        *value = codec.encrypt(&decoded.plaintext)?;
        report.fields_reencrypted += 1;
        changed += 1;
    }
    Ok(changed)
}
