use foundation::math::{Coords, GameCoord};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoordsError {
    pub reason: String,
}

impl std::fmt::Display for CoordsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "malformed coordinates: {}", self.reason)
    }
}

impl std::error::Error for CoordsError {}

/// Parse a nested game-coordinate structure.
///
/// An array of exactly two numbers is one `[x, z]` pair; any other array is a
/// sequence whose elements are parsed recursively.
pub fn parse_game_coords(value: &Value) -> Result<Coords<GameCoord>, CoordsError> {
    let items = value.as_array().ok_or_else(|| CoordsError {
        reason: format!("expected an array, found {value}"),
    })?;

    if let [Value::Number(x), Value::Number(z)] = items.as_slice() {
        let (Some(x), Some(z)) = (x.as_f64(), z.as_f64()) else {
            return Err(CoordsError {
                reason: "coordinate is not representable as f64".to_string(),
            });
        };
        return Ok(Coords::Point(GameCoord::new(x, z)));
    }

    items
        .iter()
        .map(parse_game_coords)
        .collect::<Result<Vec<_>, _>>()
        .map(Coords::List)
}
