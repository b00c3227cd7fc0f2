use rusqlite::Connection;

use crate::db::queries;
use crate::errors::AppError;

/// Runs `write` and the unit's access-list rebuild in one transaction.
pub fn write_with_access<T>(
    conn: &Connection,
    unit_id: &str,
    barbershop_id: &str,
    write: impl FnOnce(&Connection) -> Result<T, AppError>,
) -> Result<T, AppError> {
    let tx = conn.unchecked_transaction()?;
    let out = write(&tx)?;
    let count = queries::replace_unit_access(&tx, unit_id, barbershop_id)?;
    tx.commit()?;

    tracing::debug!(unit_id, barbershop_id, members = count, "reconciled unit access");
    Ok(out)
}

/// Runs `write` and rebuilds the access list of every unit in the barbershop,
/// all in one transaction. Used when the shop's roster changes.
pub fn write_with_barbershop_access<T>(
    conn: &Connection,
    barbershop_id: &str,
    write: impl FnOnce(&Connection) -> Result<T, AppError>,
) -> Result<T, AppError> {
    let tx = conn.unchecked_transaction()?;
    let out = write(&tx)?;
    for unit in queries::list_units(&tx, barbershop_id)? {
        let count = queries::replace_unit_access(&tx, &unit.id, barbershop_id)?;
        tracing::debug!(unit_id = %unit.id, barbershop_id, members = count, "reconciled unit access");
    }
    tx.commit()?;
    Ok(out)
}
