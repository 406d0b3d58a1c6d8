use pgingest_core::Point;
use tokio_postgres::{types::Type, Row};

use crate::sql_builder::SqlArgument;

/// Column order shared by INSERT, COPY and SELECT on the points table.
pub const POINT_COLUMNS: [&str; 4] = ["x", "y", "z", "attrs"];

/// Wire types for `POINT_COLUMNS`, as the binary COPY writer needs them.
pub const POINT_TYPES: [Type; 4] = [Type::FLOAT8, Type::FLOAT8, Type::FLOAT8, Type::FLOAT8_ARRAY];

pub fn point_values(point: &Point) -> Vec<SqlArgument> {
    let values: Vec<SqlArgument> = vec![Box::new(point.x), Box::new(point.y), Box::new(point.z), Box::new(point.attrs.clone())];
    values
}

pub fn point_from_row(row: &Row) -> Result<Point, tokio_postgres::Error> {
    Ok(Point { x: row.try_get("x")?, y: row.try_get("y")?, z: row.try_get("z")?, attrs: row.try_get("attrs")? })
}
