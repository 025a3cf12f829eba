//! The built-in rules.

use serde_json::json;

use super::target::{NodeFilter, Target};
use super::{Rule, Severity};
use crate::format::DocFormat;
use crate::functions::{
    DocumentSchema, ExampleKind, FormDataConsumes, OasDiscriminator, OasExample, OasSchema,
    OperationIdUnique, OperationParameters, PathParams, RefSiblings, SecurityDefined,
    ServerVariables, SuccessResponse, TagDefined, TypedEnum, UnusedComponent,
};

const OAS2: &[DocFormat] = &[DocFormat::V2];
const OAS3: &[DocFormat] = &[DocFormat::V30, DocFormat::V31];

const OAS2_SCHEMA_EXAMPLES: NodeFilter = NodeFilter {
    below: &["definitions", "parameters", "responses"],
    present: &["example", "x-example", "default"],
    truthy: &[],
    schema_like: true,
};

const OAS3_SCHEMA_EXAMPLES: NodeFilter = NodeFilter {
    below: &["components.schemas", "content", "headers", "parameters"],
    present: &["example", "default"],
    truthy: &[],
    schema_like: true,
};

const OAS2_MEDIA_EXAMPLES: NodeFilter = NodeFilter {
    below: &["responses"],
    present: &[],
    truthy: &["schema", "examples"],
    schema_like: false,
};

const OAS3_MEDIA_EXAMPLES: NodeFilter = NodeFilter {
    below: &["content", "headers", "parameters"],
    present: &["example", "examples"],
    truthy: &["schema"],
    schema_like: false,
};

/// Every built-in rule, in reporting order.
pub(super) fn recommended() -> Vec<Rule> {
    vec![
        Rule::new(
            "operation-success-response",
            Target::OperationField("responses"),
            SuccessResponse,
        )
        .message("Operation should have at least one \"2xx\" or \"3xx\" response."),
        Rule::new("path-params", Target::Document, PathParams).severity(Severity::Error),
        Rule::new("operation-parameters", Target::OperationField("parameters"), OperationParameters)
            .message("Operation parameters are unique and non-repeating."),
        Rule::new(
            "typed-enum",
            Target::Nodes {
                filter: NodeFilter {
                    truthy: &["enum", "type"],
                    ..NodeFilter::default()
                },
                field: None,
            },
            TypedEnum,
        ),
        Rule::new("oas2-schema", Target::Document, DocumentSchema)
            .severity(Severity::Error)
            .formats(OAS2),
        Rule::new("oas3-schema", Target::Document, DocumentSchema)
            .severity(Severity::Error)
            .formats(OAS3),
        Rule::new("oas3-unused-component", Target::Document, UnusedComponent)
            .formats(OAS3)
            .raw(),
        Rule::new("operation-operationId-unique", Target::Document, OperationIdUnique)
            .severity(Severity::Error)
            .message("Every operation must have unique operationId"),
        Rule::new("oas2-operation-formData-consume-check", Target::Operations, FormDataConsumes)
            .severity(Severity::Error)
            .formats(OAS2)
            .message(
                "Operations with \"in: formData\" parameter must include \"application/x-www-form-urlencoded\" or \"multipart/form-data\" in their \"consumes\" property.",
            ),
        Rule::new("operation-tag-defined", Target::Document, TagDefined)
            .severity(Severity::Error)
            .message("Operation tags must be defined in global tags"),
        Rule::new("no-$ref-siblings", Target::RefValues, RefSiblings)
            .severity(Severity::Error)
            .formats(&[DocFormat::V30, DocFormat::V2])
            .raw(),
        Rule::new(
            "oas2-operation-security-defined",
            Target::Document,
            SecurityDefined::new(["securityDefinitions"]),
        )
        .formats(OAS2),
        Rule::new(
            "oas3-operation-security-defined",
            Target::Document,
            SecurityDefined::new(["components", "securitySchemes"]),
        )
        .formats(OAS3),
        Rule::new(
            "duplicated-entry-in-enum",
            Target::Nodes {
                filter: NodeFilter {
                    truthy: &["enum"],
                    ..NodeFilter::default()
                },
                field: Some("enum"),
            },
            OasSchema::new(json!({ "type": "array", "uniqueItems": true })),
        ),
        Rule::new("oas2-discriminator", Target::DefinitionsWith("discriminator"), OasDiscriminator)
            .severity(Severity::Error)
            .formats(OAS2)
            .message("Discriminator property must be defined and required"),
        Rule::new(
            "oas2-valid-schema-example",
            Target::Nodes {
                filter: OAS2_SCHEMA_EXAMPLES,
                field: None,
            },
            OasExample::new(ExampleKind::Schema, 2, "$"),
        )
        .severity(Severity::Error)
        .formats(OAS2),
        Rule::new(
            "oas3-valid-schema-example",
            Target::Nodes {
                filter: OAS3_SCHEMA_EXAMPLES,
                field: None,
            },
            OasExample::new(ExampleKind::Schema, 3, "$"),
        )
        .severity(Severity::Error)
        .formats(OAS3),
        Rule::new(
            "oas2-valid-media-example",
            Target::Nodes {
                filter: OAS2_MEDIA_EXAMPLES,
                field: None,
            },
            OasExample::new(ExampleKind::Media, 2, "schema"),
        )
        .severity(Severity::Error)
        .formats(OAS2),
        Rule::new(
            "oas3-valid-media-example",
            Target::Nodes {
                filter: OAS3_MEDIA_EXAMPLES,
                field: None,
            },
            OasExample::new(ExampleKind::Media, 3, "schema"),
        )
        .severity(Severity::Error)
        .formats(OAS3),
        Rule::new(
            "oas3-server-variables",
            Target::Servers,
            ServerVariables::new().check_substitutions(true),
        )
        .severity(Severity::Error)
        .formats(OAS3),
    ]
}
