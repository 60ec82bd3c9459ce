//! Transaction mortality
//!
//! A mortal era is valid for `period` blocks starting at the block whose number
//! modulo `period` equals `phase`. Encoded as two little-endian bytes: the low
//! nibble is `log2(period) - 1`, the rest is the quantized phase.

use crate::codec::Input;
use crate::error::TxWrapperError;
use serde::{Deserialize, Serialize};

const MIN_PERIOD: u64 = 4;
const MAX_PERIOD: u64 = 1 << 16;

/// Transaction era (mortal or immortal)
///
/// Deserialized eras are checked with [`Era::validate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "RawEra")]
pub enum Era {
    /// Immortal transaction (never expires)
    Immortal,
    /// Mortal transaction with period and phase
    Mortal { period: u64, phase: u64 },
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
enum RawEra {
    Immortal,
    Mortal { period: u64, phase: u64 },
}

impl TryFrom<RawEra> for Era {
    type Error = TxWrapperError;

    fn try_from(raw: RawEra) -> Result<Self, Self::Error> {
        let era = match raw {
            RawEra::Immortal => Era::Immortal,
            RawEra::Mortal { period, phase } => Era::Mortal { period, phase },
        };
        era.validate()?;
        Ok(era)
    }
}

impl Era {
    /// Mortal era of roughly `period` blocks starting at `current`
    ///
    /// The period is rounded up to a power of two in `[4, 65536]` and the
    /// phase is quantized to the period's resolution.
    pub fn mortal(period: u64, current: u64) -> Self {
        let period = period
            .checked_next_power_of_two()
            .unwrap_or(MAX_PERIOD)
            .clamp(MIN_PERIOD, MAX_PERIOD);
        let phase = current % period;
        let quantize_factor = (period >> 12).max(1);
        let quantized_phase = phase / quantize_factor * quantize_factor;
        Era::Mortal {
            period,
            phase: quantized_phase,
        }
    }

    /// Check that the era encodes to exactly itself
    ///
    /// The period must be a power of two in `[4, 65536]` and the phase a
    /// multiple of the period's resolution below the period.
    pub fn validate(&self) -> Result<(), TxWrapperError> {
        match *self {
            Era::Immortal => Ok(()),
            Era::Mortal { period, phase } => {
                let quantize_factor = (period >> 12).max(1);
                if !period.is_power_of_two() || !(MIN_PERIOD..=MAX_PERIOD).contains(&period) {
                    Err(TxWrapperError::InvalidInput(format!(
                        "Mortal era period must be a power of two in [{}, {}], got {}",
                        MIN_PERIOD, MAX_PERIOD, period
                    )))
                } else if phase >= period || phase % quantize_factor != 0 {
                    Err(TxWrapperError::InvalidInput(format!(
                        "Invalid mortal era phase {} for period {}",
                        phase, period
                    )))
                } else {
                    Ok(())
                }
            }
        }
    }

    /// Check if this is an immortal era
    pub fn is_immortal(&self) -> bool {
        matches!(self, Era::Immortal)
    }

    /// First block of the validity window that contains `current`
    pub fn birth(&self, current: u64) -> u64 {
        match self {
            Era::Immortal => 0,
            Era::Mortal { period, phase } => {
                (current.max(*phase) - phase) / period * period + phase
            }
        }
    }

    /// First block after the validity window that contains `current`
    pub fn death(&self, current: u64) -> u64 {
        match self {
            Era::Immortal => u64::MAX,
            Era::Mortal { period, .. } => self.birth(current) + period,
        }
    }

    pub fn encode(&self) -> Vec<u8> {
        match self {
            Era::Immortal => vec![0x00],
            Era::Mortal { period, phase } => {
                let quantize_factor = (*period >> 12).max(1);
                let low = (period.trailing_zeros().saturating_sub(1)).clamp(1, 15) as u16;
                let high = ((*phase / quantize_factor) << 4) as u16;
                (low | high).to_le_bytes().to_vec()
            }
        }
    }

    pub fn decode(input: &mut Input<'_>) -> Result<Self, TxWrapperError> {
        let first = input.read_byte()?;
        if first == 0 {
            return Ok(Era::Immortal);
        }
        let encoded = u16::from_le_bytes([first, input.read_byte()?]) as u64;
        let period = 2u64 << (encoded % (1 << 4));
        let quantize_factor = (period >> 12).max(1);
        let phase = (encoded >> 4) * quantize_factor;
        if period >= MIN_PERIOD && phase < period {
            Ok(Era::Mortal { period, phase })
        } else {
            Err(TxWrapperError::InvalidTransaction(format!(
                "Invalid mortal era: period {}, phase {}",
                period, phase
            )))
        }
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<(Self, usize), TxWrapperError> {
        let mut input = Input::new(bytes);
        let era = Era::decode(&mut input)?;
        Ok((era, input.offset()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_immortal() {
        assert_eq!(Era::Immortal.encode(), vec![0x00]);
        assert_eq!(Era::from_bytes(&[0x00]).unwrap(), (Era::Immortal, 1));
        assert!(Era::Immortal.is_immortal());
    }

    #[rstest]
    // Reference values from the Substrate runtime
    #[case(64, 42, 64, 42, [0xa5, 0x02])]
    #[case(32768, 20000, 32768, 20000, [0x4e, 0x9c])]
    #[case(10, 5, 16, 5, [0x53, 0x00])]
    #[case(1, 1, 4, 1, [0x11, 0x00])]
    fn test_mortal_encoding(
        #[case] period: u64,
        #[case] current: u64,
        #[case] expected_period: u64,
        #[case] expected_phase: u64,
        #[case] expected: [u8; 2],
    ) {
        let era = Era::mortal(period, current);
        assert_eq!(
            era,
            Era::Mortal {
                period: expected_period,
                phase: expected_phase
            }
        );
        assert_eq!(era.encode(), expected.to_vec());
        assert_eq!(Era::from_bytes(&expected).unwrap(), (era, 2));
    }

    #[test]
    fn test_period_clamped() {
        assert_eq!(
            Era::mortal(1 << 20, 0),
            Era::Mortal {
                period: 65536,
                phase: 0
            }
        );
        assert_eq!(
            Era::mortal(u64::MAX, 0),
            Era::Mortal {
                period: 65536,
                phase: 0
            }
        );
    }

    #[test]
    fn test_birth_and_death() {
        let era = Era::mortal(64, 1000);
        assert_eq!(era.birth(1000), 1000);
        assert_eq!(era.birth(1010), 1000);
        assert_eq!(era.death(1010), 1064);
        assert_eq!(Era::Immortal.death(5), u64::MAX);
    }

    #[rstest]
    #[case::not_power_of_two(r#"{"mortal":{"period":100,"phase":70}}"#)]
    #[case::too_short(r#"{"mortal":{"period":2,"phase":0}}"#)]
    #[case::too_long(r#"{"mortal":{"period":131072,"phase":0}}"#)]
    #[case::phase_past_period(r#"{"mortal":{"period":64,"phase":64}}"#)]
    #[case::unquantized_phase(r#"{"mortal":{"period":32768,"phase":3}}"#)]
    fn test_invalid_era_rejected(#[case] json: &str) {
        assert!(serde_json::from_str::<Era>(json).is_err());
    }

    #[test]
    fn test_valid_era_deserializes() {
        let era: Era = serde_json::from_str(r#"{"mortal":{"period":64,"phase":42}}"#).unwrap();
        assert_eq!(era, Era::mortal(64, 42));
        let era: Era = serde_json::from_str(r#""immortal""#).unwrap();
        assert!(era.is_immortal());
        assert!(Era::mortal(1 << 20, 12345).validate().is_ok());
    }

    #[test]
    fn test_truncated_mortal() {
        assert_eq!(
            Era::from_bytes(&[0x25]),
            Err(TxWrapperError::truncated(1, 0))
        );
    }
}
