use thiserror::Error;

#[derive(Error, Debug)]
pub enum FgsnifferError {
    #[error("read or write file error")]
    IOError(#[from] std::io::Error),
    #[error("parse header timestamp error")]
    TimestampError(#[from] chrono::ParseError),
    #[error("payload line too short: {len} chars, need {min}")]
    PayloadLineTooShort { len: usize, min: usize },
    #[error("invalid hex digits in payload line")]
    InvalidHexPayload(#[from] hex::FromHexError),
    #[error("unknown link type: {linktype}")]
    UnknownLinkType { linktype: u32 },
}
