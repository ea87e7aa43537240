use derive_more::From;

pub type Result<T> = core::result::Result<T, Error>;

#[derive(Debug, From)]
pub enum Error {
    CliUsage(String),
    InvalidConfig(String),

    // -- Startup invariants
    InvalidSuffixTable(String),
    InvalidRegistry(String),

    // -- Zone file
    ZoneFile { path: String, reason: String },

    // -- Probes
    InvalidAlias(String),

    // -- Simulated transport failure
    #[cfg(test)]
    Unreachable(String),

    #[from]
    SystemTime(std::time::SystemTimeError),

    #[from]
    File(std::io::Error),

    #[from]
    Fmt(std::fmt::Error),

    #[from]
    SerdeJson(serde_json::Error),

    #[from]
    TimeFormat(time::error::Format),

    #[from]
    Reqwest(reqwest::Error),
}

// region:    --- Error Boilerplate

impl core::fmt::Display for Error {
    fn fmt(&self, fmt: &mut core::fmt::Formatter) -> core::result::Result<(), core::fmt::Error> {
        write!(fmt, "{self:?}")
    }
}

impl std::error::Error for Error {}

// endregion: --- Error Boilerplate
