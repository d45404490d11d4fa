//! Request and response types for the adapter's two operations.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::upstream::{ClientId, UpstreamParams};

/// Fields every registration must carry, in validation order.
pub const REQUIRED_REGISTRATION_FIELDS: [&str; 10] = [
    "firstname",
    "lastname",
    "email",
    "password",
    "address1",
    "city",
    "state",
    "postcode",
    "country",
    "phonenumber",
];

/// Login input.
#[derive(Clone)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }

    /// Pull `email` and `password` out of a request body.
    ///
    /// Returns `None` when either is missing or blank.
    pub fn from_body(body: &Map<String, Value>) -> Option<Self> {
        let email = body.get("email").and_then(scalar_text)?;
        let password = body.get("password").and_then(scalar_text)?;
        Some(Self { email, password })
    }

    /// Upstream parameters for `ValidateLogin`; the password travels as `password2`.
    pub fn to_upstream_params(&self) -> UpstreamParams {
        let mut params = UpstreamParams::new();
        params.insert("email".to_string(), self.email.clone());
        params.insert("password2".to_string(), self.password.clone());
        params
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Registration input: the caller's JSON object, forwarded nearly verbatim.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct RegistrationRequest {
    fields: Map<String, Value>,
}

impl RegistrationRequest {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self { fields }
    }

    /// First required field that is missing or blank, in declaration order.
    pub fn first_missing_field(&self) -> Option<&'static str> {
        REQUIRED_REGISTRATION_FIELDS
            .iter()
            .copied()
            .find(|field| self.fields.get(*field).map_or(true, is_blank))
    }

    /// Flatten into upstream form parameters, renaming `password` to `password2`.
    pub fn into_upstream_params(mut self) -> UpstreamParams {
        if let Some(password) = self.fields.remove("password") {
            self.fields.insert("password2".to_string(), password);
        }

        let mut params = UpstreamParams::new();
        for (key, value) in &self.fields {
            flatten_form_value(&mut params, key.clone(), value);
        }
        params
    }
}

/// Client data exposed to login callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientProfile {
    pub id: ClientId,
    pub first_name: String,
    pub last_name: String,
    pub email_verified: bool,
}

/// `client` record inside a `GetClientsDetails` response.
#[derive(Debug, Clone, Deserialize)]
pub struct ClientRecord {
    #[serde(default)]
    pub firstname: String,
    #[serde(default)]
    pub lastname: String,
    #[serde(default, deserialize_with = "lenient_bool")]
    pub email_verified: bool,
}

impl ClientRecord {
    pub fn into_profile(self, id: ClientId) -> ClientProfile {
        ClientProfile {
            id,
            first_name: self.firstname,
            last_name: self.lastname,
            email_verified: self.email_verified,
        }
    }
}

/// Operation-specific part of an [`AdapterResult`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AdapterPayload {
    Login {
        user: ClientProfile,
    },
    Registration {
        #[serde(rename = "clientId")]
        client_id: Option<ClientId>,
    },
}

/// Uniform response envelope returned to HTTP callers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdapterResult {
    pub success: bool,
    pub message: String,
    #[serde(flatten)]
    pub payload: Option<AdapterPayload>,
}

impl AdapterResult {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            payload: None,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            payload: None,
        }
    }

    pub fn with_payload(mut self, payload: AdapterPayload) -> Self {
        self.payload = Some(payload);
        self
    }

    /// Logged-in user, if the envelope carries one.
    pub fn user(&self) -> Option<&ClientProfile> {
        match &self.payload {
            Some(AdapterPayload::Login { user }) => Some(user),
            _ => None,
        }
    }
}

/// Absent-equivalent values: `null`, `""`, `"0"`, zero, `false`, `[]`, `{}`.
pub fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::String(s) => s.is_empty() || s == "0",
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        Value::Number(n) => n.as_f64() == Some(0.0),
    }
}

/// Text form of a non-blank scalar (string, number or `true`).
fn scalar_text(value: &Value) -> Option<String> {
    if is_blank(value) {
        return None;
    }
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(true) => Some("1".to_string()),
        _ => None,
    }
}

/// Form-encode `value` under `key`: scalars as text, booleans as `1`/`0`,
/// `null` dropped, nested arrays and objects in bracket notation.
pub fn flatten_form_value(params: &mut UpstreamParams, key: String, value: &Value) {
    match value {
        Value::Null => {}
        Value::Bool(b) => {
            params.insert(key, if *b { "1" } else { "0" }.to_string());
        }
        Value::Number(n) => {
            params.insert(key, n.to_string());
        }
        Value::String(s) => {
            params.insert(key, s.clone());
        }
        Value::Array(items) => {
            for (index, item) in items.iter().enumerate() {
                flatten_form_value(params, format!("{key}[{index}]"), item);
            }
        }
        Value::Object(map) => {
            for (name, item) in map {
                flatten_form_value(params, format!("{key}[{name}]"), item);
            }
        }
    }
}

/// Accepts `true`/`false`, `0`/`1` and their string spellings.
fn lenient_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Bool(b) => b,
        Value::Number(n) => n.as_f64().map_or(false, |n| n != 0.0),
        Value::String(s) => matches!(s.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"),
        _ => false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn full_registration() -> Map<String, Value> {
        json!({
            "firstname": "Jane",
            "lastname": "Roe",
            "email": "jane@example.com",
            "password": "pa55word",
            "address1": "1 Main St",
            "city": "Springfield",
            "state": "IL",
            "postcode": "62701",
            "country": "US",
            "phonenumber": "555-0100"
        })
        .as_object()
        .cloned()
        .unwrap()
    }

    #[test]
    fn test_complete_registration_has_no_missing_field() {
        let request = RegistrationRequest::new(full_registration());
        assert_eq!(request.first_missing_field(), None);
    }

    #[test]
    fn test_missing_field_reported_in_declaration_order() {
        let mut fields = full_registration();
        fields.remove("phonenumber");
        fields.insert("city".to_string(), json!(""));
        let request = RegistrationRequest::new(fields);
        assert_eq!(request.first_missing_field(), Some("city"));
    }

    #[test]
    fn test_each_required_field_detected() {
        for field in REQUIRED_REGISTRATION_FIELDS {
            let mut fields = full_registration();
            fields.remove(field);
            let request = RegistrationRequest::new(fields);
            assert_eq!(request.first_missing_field(), Some(field));
        }
    }

    #[test]
    fn test_blank_values() {
        assert!(is_blank(&json!(null)));
        assert!(is_blank(&json!("")));
        assert!(is_blank(&json!(false)));
        assert!(is_blank(&json!([])));
        assert!(is_blank(&json!({})));
        assert!(is_blank(&json!(0)));
        assert!(is_blank(&json!(0.0)));
        assert!(is_blank(&json!("0")));
        assert!(!is_blank(&json!(7)));
        assert!(!is_blank(&json!("00")));
        assert!(!is_blank(&json!(" ")));
        assert!(!is_blank(&json!(true)));
    }

    #[test]
    fn test_password_renamed_to_password2() {
        let params = RegistrationRequest::new(full_registration()).into_upstream_params();
        assert_eq!(params.get("password2").map(String::as_str), Some("pa55word"));
        assert!(!params.contains_key("password"));
        assert_eq!(params.get("firstname").map(String::as_str), Some("Jane"));
        assert_eq!(params.len(), 10);
    }

    #[test]
    fn test_password_overwrites_caller_password2() {
        let mut fields = full_registration();
        fields.insert("password2".to_string(), json!("other"));
        let params = RegistrationRequest::new(fields).into_upstream_params();
        assert_eq!(params["password2"], "pa55word");
    }

    #[test]
    fn test_optional_fields_flattened() {
        let mut fields = full_registration();
        fields.insert("companyname".to_string(), json!("Acme"));
        fields.insert("currency".to_string(), json!(2));
        fields.insert("noemail".to_string(), json!(true));
        fields.insert("marketingoptin".to_string(), json!(false));
        fields.insert("notes".to_string(), json!(null));
        fields.insert("customfields".to_string(), json!(["a", "b"]));
        fields.insert("meta".to_string(), json!({"source": "web"}));

        let params = RegistrationRequest::new(fields).into_upstream_params();

        assert_eq!(params["companyname"], "Acme");
        assert_eq!(params["currency"], "2");
        assert_eq!(params["noemail"], "1");
        assert_eq!(params["marketingoptin"], "0");
        assert!(!params.contains_key("notes"));
        assert_eq!(params["customfields[0]"], "a");
        assert_eq!(params["customfields[1]"], "b");
        assert_eq!(params["meta[source]"], "web");
    }

    #[test]
    fn test_credentials_from_body() {
        let body = json!({"email": "a@example.com", "password": "secret"});
        let credentials = Credentials::from_body(body.as_object().unwrap()).unwrap();
        assert_eq!(credentials.email, "a@example.com");

        let params = credentials.to_upstream_params();
        assert_eq!(params["password2"], "secret");
        assert!(!params.contains_key("password"));
    }

    #[test]
    fn test_credentials_require_both_fields() {
        let missing = json!({"email": "a@example.com"});
        let blank = json!({"email": "", "password": "secret"});
        let object = json!({"email": {"x": 1}, "password": "secret"});
        let zero = json!({"email": "a@example.com", "password": "0"});
        let numeric_zero = json!({"email": "a@example.com", "password": 0});

        assert!(Credentials::from_body(missing.as_object().unwrap()).is_none());
        assert!(Credentials::from_body(blank.as_object().unwrap()).is_none());
        assert!(Credentials::from_body(object.as_object().unwrap()).is_none());
        assert!(Credentials::from_body(zero.as_object().unwrap()).is_none());
        assert!(Credentials::from_body(numeric_zero.as_object().unwrap()).is_none());
    }

    #[test]
    fn test_credentials_debug_redacts_password() {
        let rendered = format!("{:?}", Credentials::new("a@example.com", "hunter2"));
        assert!(!rendered.contains("hunter2"));
    }

    #[test]
    fn test_client_record_lenient_email_verified() {
        for (raw, expected) in [
            (json!(true), true),
            (json!(1), true),
            (json!("1"), true),
            (json!(0), false),
            (json!("false"), false),
        ] {
            let record: ClientRecord = serde_json::from_value(json!({
                "firstname": "John",
                "lastname": "Doe",
                "email_verified": raw
            }))
            .unwrap();
            assert_eq!(record.email_verified, expected);
        }
    }

    #[test]
    fn test_login_envelope_shape() {
        let user = ClientRecord {
            firstname: "John".to_string(),
            lastname: "Doe".to_string(),
            email_verified: true,
        }
        .into_profile(ClientId::Numeric(123));
        let result = AdapterResult::success("Login successful")
            .with_payload(AdapterPayload::Login { user });

        assert_eq!(
            serde_json::to_value(&result).unwrap(),
            json!({
                "success": true,
                "message": "Login successful",
                "user": {
                    "id": 123,
                    "firstName": "John",
                    "lastName": "Doe",
                    "emailVerified": true
                }
            })
        );
    }

    #[test]
    fn test_registration_envelope_always_has_client_id() {
        let result = AdapterResult::failure("Email already exists")
            .with_payload(AdapterPayload::Registration { client_id: None });

        assert_eq!(
            serde_json::to_value(&result).unwrap(),
            json!({"success": false, "message": "Email already exists", "clientId": null})
        );
    }

    #[test]
    fn test_bare_envelope_shape() {
        let result = AdapterResult::failure("Invalid email or password");
        assert_eq!(
            serde_json::to_value(&result).unwrap(),
            json!({"success": false, "message": "Invalid email or password"})
        );
    }
}
