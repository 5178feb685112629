//! ICS-20 denomination traces.
//!
//! A fungible token sent over IBC is represented on the receiving chain by a voucher
//! denominated `ibc/{HASH}`, where `HASH` is the uppercase hex SHA256 of the full trace
//! `{port}/{channel}/.../{base_denom}`. The trace is prefixed with the port and channel
//! on the RECEIVING end of every hop the token has travelled.
use crate::sha256::Sha256;

/// Prefix of IBC voucher denominations.
pub const IBC_DENOM_PREFIX: &str = "ibc";
/// Prefix of channel identifiers.
const CHANNEL_PREFIX: &str = "channel-";

/// Path and base denomination of a (possibly) multi-hop token.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DenomTrace {
    /// Sequence of `{port}/{channel}` pairs joined with `/`. Empty for native tokens.
    pub path: String,
    /// Denomination on the chain the token originates from.
    pub base_denom: String,
}

impl DenomTrace {
    /// Parses a full denomination path, like `transfer/channel-0/uatom`.
    ///
    /// Pairs of segments are consumed as long as the second segment of the pair is a
    /// valid channel identifier. Everything that follows is the base denomination,
    /// which is allowed to contain slashes itself (e.g. `gamm/pool/1`).
    pub fn parse(raw: &str) -> Self {
        let segments: Vec<&str> = raw.split('/').collect();
        if segments.len() == 1 {
            return Self {
                path: String::new(),
                base_denom: raw.to_owned(),
            };
        }
        let mut path = vec![];
        let mut base = &segments[..];
        let mut i = 0;
        while i < segments.len() {
            if i + 1 < segments.len() && segments.len() > 2 && is_channel_id(segments[i + 1]) {
                path.extend_from_slice(&segments[i..i + 2]);
                i += 2;
                base = &segments[i..];
            } else {
                base = &segments[i..];
                break;
            }
        }
        Self {
            path: path.join("/"),
            base_denom: base.join("/"),
        }
    }

    /// Full trace, `{path}/{base_denom}`, or just the base denomination for native tokens.
    pub fn full_path(&self) -> String {
        if self.path.is_empty() {
            self.base_denom.clone()
        } else {
            format!("{}/{}", self.path, self.base_denom)
        }
    }

    /// Hash of the full trace.
    pub fn hash(&self) -> Sha256 {
        Sha256::new(self.full_path().as_bytes())
    }

    /// Denomination under which the token is held on the chain at the end of the path.
    /// Native tokens keep their base denomination.
    pub fn ibc_denom(&self) -> String {
        if self.path.is_empty() {
            return self.base_denom.clone();
        }
        format!("{IBC_DENOM_PREFIX}/{}", self.hash().to_hex_upper())
    }
}

/// Prefixes `denom` with a single `{port}/{channel}` hop.
pub fn prefixed_denom(port_id: &str, channel_id: &str, denom: &str) -> String {
    format!("{port_id}/{channel_id}/{denom}")
}

/// Denomination of `base_denom` after it is received over `{port_id}/{channel_id}`.
/// `port_id` and `channel_id` identify the receiving end of the channel.
pub fn ibc_denom(port_id: &str, channel_id: &str, base_denom: &str) -> String {
    DenomTrace::parse(&prefixed_denom(port_id, channel_id, base_denom)).ibc_denom()
}

/// Checks whether `id` has the `channel-{N}` format, with `N` a decimal u64.
fn is_channel_id(id: &str) -> bool {
    let Some(sequence) = id.strip_prefix(CHANNEL_PREFIX) else {
        return false;
    };
    !sequence.is_empty()
        && sequence.bytes().all(|b| b.is_ascii_digit())
        && sequence.parse::<u64>().is_ok()
}
