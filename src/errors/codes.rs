use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// The fixed structural-error taxonomy.
///
/// Codes and messages are a wire contract: do not renumber without a version
/// bump.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u16)]
pub enum ErrorCode {
    PathNotFound = 101,
    ApiNotBuilt = 102,
    OriginalRequestInvalid = 103,
    ControllerError = 104,
    Locked = 105,
    TokenNotSupported = 106,
    RouteNotSupported = 107,
    InvalidRouteName = 108,
    RouteNameAlreadyAdded = 109,
    InvalidPathParams = 110,
    InvalidPath = 111,
    PathAlreadyAdded = 112,
    NoMethodsDefined = 113,
    InvalidRequest = 114,
    InvalidTokenName = 115,
    InvalidParameters = 116,
    ControllerMissing = 117,
    UnassignedAuthToken = 118,
}

impl ErrorCode {
    pub const ALL: [ErrorCode; 18] = [
        ErrorCode::PathNotFound,
        ErrorCode::ApiNotBuilt,
        ErrorCode::OriginalRequestInvalid,
        ErrorCode::ControllerError,
        ErrorCode::Locked,
        ErrorCode::TokenNotSupported,
        ErrorCode::RouteNotSupported,
        ErrorCode::InvalidRouteName,
        ErrorCode::RouteNameAlreadyAdded,
        ErrorCode::InvalidPathParams,
        ErrorCode::InvalidPath,
        ErrorCode::PathAlreadyAdded,
        ErrorCode::NoMethodsDefined,
        ErrorCode::InvalidRequest,
        ErrorCode::InvalidTokenName,
        ErrorCode::InvalidParameters,
        ErrorCode::ControllerMissing,
        ErrorCode::UnassignedAuthToken,
    ];

    /// Stable numeric identifier exposed to hosts.
    #[must_use]
    pub fn code(self) -> u16 {
        self as u16
    }

    /// Canonical message bound to the code.
    #[must_use]
    pub fn message(self) -> &'static str {
        match self {
            ErrorCode::PathNotFound => "Path not found",
            ErrorCode::ApiNotBuilt => "Api not built",
            ErrorCode::OriginalRequestInvalid => "Original request not valid",
            ErrorCode::ControllerError => "Controller Error",
            ErrorCode::Locked => "Api is locked and cannot be updated",
            ErrorCode::TokenNotSupported => "Auth token not supported",
            ErrorCode::RouteNotSupported => "Route not supported",
            ErrorCode::InvalidRouteName => "Invalid route name",
            ErrorCode::RouteNameAlreadyAdded => "Route name already added",
            ErrorCode::InvalidPathParams => "Path parameters do not match schema",
            ErrorCode::InvalidPath => "Invalid path",
            ErrorCode::PathAlreadyAdded => "Path already added",
            ErrorCode::NoMethodsDefined => "No methods defined",
            ErrorCode::InvalidRequest => "Invalid request",
            ErrorCode::InvalidTokenName => "Invalid token name",
            ErrorCode::InvalidParameters => "Invalid parameters",
            ErrorCode::ControllerMissing => "Not all endpoints have a controller",
            ErrorCode::UnassignedAuthToken => "One or more auth tokens to not have a handler",
        }
    }

    /// Reverse lookup for codes received over the wire.
    #[must_use]
    pub fn from_code(code: u16) -> Option<Self> {
        Self::ALL.iter().copied().find(|c| c.code() == code)
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl Serialize for ErrorCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u16(self.code())
    }
}

impl<'de> Deserialize<'de> for ErrorCode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let code = u16::deserialize(deserializer)?;
        ErrorCode::from_code(code)
            .ok_or_else(|| serde::de::Error::custom(format!("unknown error code {code}")))
    }
}
