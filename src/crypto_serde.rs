//! Serde helpers for the witness and wire encodings.
//!
//! Witness dictionaries render scalars as decimal strings, points as
//! two-element `[x, y]` decimal arrays, and ciphertext vectors as decimal
//! arrays, the input format the prover oracle consumes.

use ark_ed_on_bn254::EdwardsAffine;
use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::field::{from_decimal, to_decimal, Fq, Fr};

/// `F_p` elements as decimal strings.
pub mod fq_dec {
    use super::*;

    pub fn serialize<S: Serializer>(value: &Fq, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&to_decimal(value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Fq, D::Error> {
        let text = String::deserialize(deserializer)?;
        from_decimal(&text).map_err(DeError::custom)
    }
}

/// Subgroup scalars as decimal strings.
pub mod fr_dec {
    use super::*;

    pub fn serialize<S: Serializer>(value: &Fr, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&to_decimal(value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Fr, D::Error> {
        let text = String::deserialize(deserializer)?;
        from_decimal(&text).map_err(DeError::custom)
    }
}

/// Curve points as `[x, y]` decimal arrays.
pub mod point_dec {
    use super::*;
    use crate::jubjub::validate_point;

    pub fn serialize<S: Serializer>(
        value: &EdwardsAffine,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        [to_decimal(&value.x), to_decimal(&value.y)].serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<EdwardsAffine, D::Error> {
        let [x, y] = <[String; 2]>::deserialize(deserializer)?;
        let point = EdwardsAffine::new_unchecked(
            from_decimal(&x).map_err(DeError::custom)?,
            from_decimal(&y).map_err(DeError::custom)?,
        );
        validate_point(&point).map_err(DeError::custom)?;
        Ok(point)
    }
}

/// Fixed-width `F_p` arrays (PCT ciphers, wire tuples) as decimal arrays.
pub mod fq_array_dec {
    use super::*;

    pub fn serialize<S: Serializer, const N: usize>(
        value: &[Fq; N],
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        let rendered: Vec<String> = value.iter().map(to_decimal).collect();
        rendered.serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>, const N: usize>(
        deserializer: D,
    ) -> Result<[Fq; N], D::Error> {
        let rendered = Vec::<String>::deserialize(deserializer)?;
        if rendered.len() != N {
            return Err(DeError::custom(format!(
                "expected {N} elements, got {}",
                rendered.len()
            )));
        }
        let parsed = rendered
            .iter()
            .map(|text| from_decimal(text).map_err(DeError::custom))
            .collect::<Result<Vec<Fq>, D::Error>>()?;
        parsed
            .try_into()
            .map_err(|_| DeError::custom("length mismatch"))
    }
}

/// Variable-length `F_p` vectors as decimal arrays.
pub mod fq_vec_dec {
    use super::*;

    pub fn serialize<S: Serializer>(value: &[Fq], serializer: S) -> Result<S::Ok, S::Error> {
        let rendered: Vec<String> = value.iter().map(to_decimal).collect();
        rendered.serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<Fq>, D::Error> {
        let rendered = Vec::<String>::deserialize(deserializer)?;
        rendered
            .iter()
            .map(|text| from_decimal(text).map_err(DeError::custom))
            .collect()
    }
}
