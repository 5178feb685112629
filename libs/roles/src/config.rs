//! Chain configuration.
use anyhow::Context as _;
use serde::{Deserialize, Serialize};

/// Container registry hosting the heighliner images of Cosmos SDK chains.
const HEIGHLINER_REPOSITORY: &str = "ghcr.io/strangelove-ventures/heighliner";

/// Container image to run the nodes of a chain from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DockerImage {
    /// Image repository, e.g. `ghcr.io/strangelove-ventures/heighliner/gaia`.
    pub repository: String,
    /// Image tag. Empty means the registry default.
    #[serde(default)]
    pub version: String,
}

impl DockerImage {
    /// Full image reference, `repository:version`.
    pub fn reference(&self) -> String {
        if self.version.is_empty() {
            self.repository.clone()
        } else {
            format!("{}:{}", self.repository, self.version)
        }
    }
}

/// Immutable description of a chain under test, shared by all of its nodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChainConfig {
    /// Chain family. Only `cosmos` is supported.
    #[serde(rename = "type")]
    pub chain_type: String,
    /// Chain name, e.g. `gaia`.
    pub name: String,
    /// Chain id written to genesis, e.g. `cosmoshub-test-1`.
    pub chain_id: String,
    /// Name of the node binary inside the image.
    pub bin: String,
    /// Bech32 prefix of account addresses, e.g. `cosmos`.
    pub bech32_prefix: String,
    /// Native fee denomination, e.g. `uatom`.
    pub denom: String,
    /// Gas price expression: price per unit of gas followed by the denomination, e.g. `0.01uatom`.
    pub gas_prices: String,
    /// Multiplier applied to simulated gas when submitting transactions.
    pub gas_adjustment: f64,
    /// Trusting period of light clients tracking this chain, e.g. `330h`.
    pub trusting_period: String,
    /// Images to pull before starting the nodes. The first one is used to run them.
    pub images: Vec<DockerImage>,
}

impl ChainConfig {
    /// Configuration of a Cosmos SDK chain published as a heighliner image.
    pub fn heighliner(
        name: &str,
        binary: &str,
        bech32_prefix: &str,
        denom: &str,
        gas_prices: &str,
        gas_adjustment: f64,
        trusting_period: &str,
    ) -> Self {
        Self {
            chain_type: "cosmos".to_owned(),
            name: name.to_owned(),
            chain_id: name.to_owned(),
            bin: binary.to_owned(),
            bech32_prefix: bech32_prefix.to_owned(),
            denom: denom.to_owned(),
            gas_prices: gas_prices.to_owned(),
            gas_adjustment,
            trusting_period: trusting_period.to_owned(),
            images: vec![DockerImage {
                repository: format!("{HEIGHLINER_REPOSITORY}/{name}"),
                version: String::new(),
            }],
        }
    }

    /// Overrides the chain id.
    pub fn with_chain_id(mut self, chain_id: &str) -> Self {
        self.chain_id = chain_id.to_owned();
        self
    }

    /// Pins the version of the first image.
    pub fn with_image_version(mut self, version: &str) -> Self {
        if let Some(image) = self.images.first_mut() {
            image.version = version.to_owned();
        }
        self
    }

    /// Price per unit of gas, parsed from `gas_prices` by stripping the denomination.
    pub fn gas_price(&self) -> anyhow::Result<GasPrice> {
        let amount = self
            .gas_prices
            .trim()
            .strip_suffix(self.denom.as_str())
            .with_context(|| {
                format!(
                    "gas prices {:?} are not denominated in {:?}",
                    self.gas_prices, self.denom
                )
            })?;
        amount
            .parse()
            .with_context(|| format!("gas prices {:?}", self.gas_prices))
    }

    /// Fees paid in the native denomination for `gas` units of gas.
    pub fn gas_fees(&self, gas: i64) -> anyhow::Result<i64> {
        Ok(self.gas_price()?.fees(gas))
    }
}

/// Non-negative decimal price of a unit of gas, kept exact as `mantissa / 10^scale`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GasPrice {
    mantissa: u64,
    scale: u32,
}

/// Error returned when parsing a `GasPrice`.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum GasPriceError {
    /// Not a plain decimal number.
    #[error("{0:?} is not a decimal number")]
    NotDecimal(String),
    /// Too many significant digits.
    #[error("{0:?} has too many digits")]
    Overflow(String),
}

impl std::str::FromStr for GasPrice {
    type Err = GasPriceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (int, frac) = s.split_once('.').unwrap_or((s, ""));
        let is_digits = |x: &str| x.bytes().all(|b| b.is_ascii_digit());
        if (int.is_empty() && frac.is_empty()) || !is_digits(int) || !is_digits(frac) {
            return Err(GasPriceError::NotDecimal(s.to_owned()));
        }
        let digits = format!("{int}{frac}");
        let mantissa = if digits.is_empty() {
            0
        } else {
            digits
                .parse::<u64>()
                .map_err(|_| GasPriceError::Overflow(s.to_owned()))?
        };
        let scale = u32::try_from(frac.len()).map_err(|_| GasPriceError::Overflow(s.to_owned()))?;
        if 10u128.checked_pow(scale).is_none() {
            return Err(GasPriceError::Overflow(s.to_owned()));
        }
        Ok(Self { mantissa, scale })
    }
}

impl GasPrice {
    /// Fees for `gas` units of gas, truncated toward zero.
    pub fn fees(&self, gas: i64) -> i64 {
        let total = i128::from(gas) * i128::from(self.mantissa);
        // `from_str` guarantees that the power fits.
        let divisor = 10i128.pow(self.scale);
        i64::try_from(total / divisor).unwrap_or(if total < 0 { i64::MIN } else { i64::MAX })
    }
}
