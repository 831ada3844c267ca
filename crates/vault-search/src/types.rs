//! Decrypted vault views searched by the query engine.
//!
//! These mirror the shapes handed over by the decryption layer. Everything
//! serializes in camelCase; the serialized property paths (`login.username`,
//! `card.brand`, ...) are the field names understood by field terms.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Kind of vault entry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CipherType {
    #[default]
    Login,
    SecureNote,
    Card,
    Identity,
    SshKey,
}

impl CipherType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Login => "Login",
            Self::SecureNote => "SecureNote",
            Self::Card => "Card",
            Self::Identity => "Identity",
            Self::SshKey => "SshKey",
        }
    }

    /// Resolves a user-facing type name. Case, spaces, dashes and
    /// underscores are ignored, so `Secure Note` and `secure_note` both work.
    pub fn from_name(name: &str) -> Option<Self> {
        let normalized = name
            .chars()
            .filter(|ch| !matches!(ch, ' ' | '_' | '-'))
            .collect::<String>()
            .to_lowercase();
        match normalized.as_str() {
            "login" => Some(Self::Login),
            "securenote" | "note" => Some(Self::SecureNote),
            "card" => Some(Self::Card),
            "identity" => Some(Self::Identity),
            "sshkey" => Some(Self::SshKey),
            _ => None,
        }
    }
}

/// How a stored login URI is compared against a website.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UriMatchStrategy {
    /// Same base domain (`accounts.example.com` ~ `example.com`).
    #[default]
    Domain,
    /// Same host and port.
    Host,
    StartsWith,
    Exact,
    /// The stored URI is a regular expression tested against the website.
    Regex,
    Never,
}

impl UriMatchStrategy {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Domain => "domain",
            Self::Host => "host",
            Self::StartsWith => "starts_with",
            Self::Exact => "exact",
            Self::Regex => "regex",
            Self::Never => "never",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "domain" | "base_domain" => Some(Self::Domain),
            "host" => Some(Self::Host),
            "starts_with" | "startswith" | "prefix" => Some(Self::StartsWith),
            "exact" => Some(Self::Exact),
            "regex" | "regular_expression" => Some(Self::Regex),
            "never" => Some(Self::Never),
            _ => None,
        }
    }
}

/// A decrypted vault entry.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CipherView {
    pub id: String,
    pub organization_id: Option<String>,
    pub folder_id: Option<String>,
    #[serde(default)]
    pub collection_ids: Vec<String>,
    pub name: String,
    pub notes: Option<String>,
    #[serde(rename = "type")]
    pub cipher_type: CipherType,
    #[serde(default)]
    pub favorite: bool,
    pub login: Option<LoginView>,
    pub card: Option<CardView>,
    pub identity: Option<IdentityView>,
    pub ssh_key: Option<SshKeyView>,
    /// Custom fields. Not walked as item properties; the field collector
    /// appends them explicitly.
    #[serde(default)]
    pub fields: Vec<FieldView>,
    #[serde(default)]
    pub attachments: Vec<AttachmentView>,
    pub creation_date: Option<DateTime<Utc>>,
    pub revision_date: Option<DateTime<Utc>>,
    /// Set when the item sits in the trash.
    pub deleted_date: Option<DateTime<Utc>>,
}

impl CipherView {
    /// Login URIs, empty for non-login items.
    pub fn login_uris(&self) -> &[LoginUriView] {
        self.login
            .as_ref()
            .map(|login| login.uris.as_slice())
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginView {
    pub username: Option<String>,
    pub password: Option<String>,
    /// One-time-code seed.
    pub totp: Option<String>,
    #[serde(default)]
    pub uris: Vec<LoginUriView>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginUriView {
    pub uri: Option<String>,
    #[serde(rename = "match")]
    pub match_type: Option<UriMatchStrategy>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardView {
    pub cardholder_name: Option<String>,
    pub brand: Option<String>,
    pub number: Option<String>,
    pub exp_month: Option<String>,
    pub exp_year: Option<String>,
    pub code: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentityView {
    pub title: Option<String>,
    pub first_name: Option<String>,
    pub middle_name: Option<String>,
    pub last_name: Option<String>,
    pub company: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub username: Option<String>,
    pub address1: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub postal_code: Option<String>,
    pub country: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SshKeyView {
    pub private_key: Option<String>,
    pub public_key: Option<String>,
    pub key_fingerprint: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldType {
    #[default]
    Text,
    Hidden,
    Boolean,
    /// Value is taken from another property of the item.
    Linked,
}

/// Item property a linked custom field points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LinkedId {
    LoginUsername,
    LoginPassword,
    CardCardholderName,
    CardBrand,
    CardNumber,
    CardExpMonth,
    CardExpYear,
    CardCode,
    IdentityTitle,
    IdentityFirstName,
    IdentityMiddleName,
    IdentityLastName,
    IdentityCompany,
    IdentityEmail,
    IdentityPhone,
    IdentityUsername,
}

impl LinkedId {
    /// Serialized path of the property this link resolves to.
    pub fn property_path(self) -> &'static str {
        match self {
            Self::LoginUsername => "login.username",
            Self::LoginPassword => "login.password",
            Self::CardCardholderName => "card.cardholderName",
            Self::CardBrand => "card.brand",
            Self::CardNumber => "card.number",
            Self::CardExpMonth => "card.expMonth",
            Self::CardExpYear => "card.expYear",
            Self::CardCode => "card.code",
            Self::IdentityTitle => "identity.title",
            Self::IdentityFirstName => "identity.firstName",
            Self::IdentityMiddleName => "identity.middleName",
            Self::IdentityLastName => "identity.lastName",
            Self::IdentityCompany => "identity.company",
            Self::IdentityEmail => "identity.email",
            Self::IdentityPhone => "identity.phone",
            Self::IdentityUsername => "identity.username",
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldView {
    pub name: Option<String>,
    pub value: Option<String>,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    pub linked_id: Option<LinkedId>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttachmentView {
    pub id: String,
    pub file_name: Option<String>,
    pub size: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FolderView {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionView {
    pub id: String,
    pub organization_id: Option<String>,
    pub name: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Organization {
    pub id: String,
    pub name: String,
}
