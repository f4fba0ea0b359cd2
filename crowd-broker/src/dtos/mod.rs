pub mod directory;

pub use directory::{
    AppAuthRequest, AppIdentity, Attribute, GroupsResponse, PasswordCredential,
    PrincipalAuthRequest, PrincipalTokenRequest, TokenResponse, ValidResponse,
    ValidateTokenRequest, ValidationFactor,
};
