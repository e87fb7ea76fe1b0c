//! Invocation metadata.
//!
//! The platform hands every invocation a context object next to the event. It
//! never influences HTTP semantics; the bridge only flattens it into an
//! attribute map the application can inspect.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Metadata about the current function invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvocationContext {
    #[serde(default, alias = "functionName")]
    pub function_name: String,

    #[serde(default, alias = "functionVersion")]
    pub function_version: String,

    #[serde(default, alias = "invokedFunctionArn")]
    pub invoked_function_arn: String,

    #[serde(
        default,
        alias = "memoryLimitInMB",
        deserialize_with = "deserialize_memory_limit"
    )]
    pub memory_limit_in_mb: u32,

    #[serde(default, alias = "awsRequestId")]
    pub aws_request_id: String,

    #[serde(default, alias = "logGroupName")]
    pub log_group_name: String,

    #[serde(default, alias = "logStreamName")]
    pub log_stream_name: String,
}

impl InvocationContext {
    /// Fill the per-function fields from the runtime's reserved environment
    /// variables. Request id and ARN are per-invocation and must be supplied.
    pub fn from_env(aws_request_id: impl Into<String>, invoked_function_arn: impl Into<String>) -> Self {
        Self::from_lookup(
            |key| std::env::var(key).ok(),
            aws_request_id,
            invoked_function_arn,
        )
    }

    pub fn from_lookup<F>(
        lookup: F,
        aws_request_id: impl Into<String>,
        invoked_function_arn: impl Into<String>,
    ) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).unwrap_or_default();
        Self {
            function_name: var("AWS_LAMBDA_FUNCTION_NAME"),
            function_version: var("AWS_LAMBDA_FUNCTION_VERSION"),
            invoked_function_arn: invoked_function_arn.into(),
            memory_limit_in_mb: lookup("AWS_LAMBDA_FUNCTION_MEMORY_SIZE")
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(0),
            aws_request_id: aws_request_id.into(),
            log_group_name: var("AWS_LAMBDA_LOG_GROUP_NAME"),
            log_stream_name: var("AWS_LAMBDA_LOG_STREAM_NAME"),
        }
    }

    /// Flatten into a plain attribute map keyed by the snake_case field names.
    pub fn to_attributes(&self) -> Map<String, Value> {
        let mut attrs = Map::new();
        attrs.insert("function_name".into(), self.function_name.clone().into());
        attrs.insert("function_version".into(), self.function_version.clone().into());
        attrs.insert(
            "invoked_function_arn".into(),
            self.invoked_function_arn.clone().into(),
        );
        attrs.insert("memory_limit_in_mb".into(), self.memory_limit_in_mb.into());
        attrs.insert("aws_request_id".into(), self.aws_request_id.clone().into());
        attrs.insert("log_group_name".into(), self.log_group_name.clone().into());
        attrs.insert("log_stream_name".into(), self.log_stream_name.clone().into());
        attrs
    }
}

/// Memory limits arrive as numbers from some runtimes and as numeric strings
/// from others.
fn deserialize_memory_limit<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumberOrString {
        Number(u32),
        String(String),
    }

    match NumberOrString::deserialize(deserializer)? {
        NumberOrString::Number(n) => Ok(n),
        NumberOrString::String(s) => s
            .trim()
            .parse()
            .map_err(|_| serde::de::Error::custom(format!("invalid memory limit: {s:?}"))),
    }
}
