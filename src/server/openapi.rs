//! OpenAPI synthesis from the operation registry.
//!
//! The document is derived once at startup: one path entry per operation,
//! request schema with every declared field as a required string property,
//! and the shared 200/500 response shapes. Served as JSON under
//! `/api-docs/openapi.json`, with an interactive viewer at `/api-docs`.

use axum::response::Html;
use utoipa::openapi::path::{HttpMethod, OperationBuilder, PathItem};
use utoipa::openapi::request_body::RequestBodyBuilder;
use utoipa::openapi::response::ResponseBuilder;
use utoipa::openapi::schema::{ObjectBuilder, Type};
use utoipa::openapi::server::Server;
use utoipa::openapi::{Content, InfoBuilder, OpenApi, OpenApiBuilder, PathsBuilder, Required};

use crate::registry::{Operation, Registry};

/// Derive the OpenAPI document for every registered operation.
pub fn synthesize(registry: &Registry) -> OpenApi {
    let mut paths = PathsBuilder::new();
    for operation in registry.operations() {
        paths = paths.path(operation.route, path_item(operation));
    }

    OpenApiBuilder::new()
        .info(
            InfoBuilder::new()
                .title("prompt-relay")
                .version(env!("CARGO_PKG_VERSION"))
                .description(Some("A simple API to interact with text-generation prompts"))
                .build(),
        )
        .servers(Some(vec![Server::new("/")]))
        .paths(paths.build())
        .build()
}

fn path_item(operation: &Operation) -> PathItem {
    let mut request_schema = ObjectBuilder::new();
    for &field in operation.input_variables {
        request_schema = request_schema
            .property(field, ObjectBuilder::new().schema_type(Type::String))
            .required(field);
    }

    let request_body = RequestBodyBuilder::new()
        .content("application/json", Content::new(Some(request_schema)))
        .required(Some(Required::True))
        .build();

    let ok_schema = ObjectBuilder::new().property(
        "text",
        ObjectBuilder::new().schema_type(Type::String),
    );
    let error_schema = ObjectBuilder::new().property(
        "error",
        ObjectBuilder::new().schema_type(Type::String),
    );

    let spec_operation = OperationBuilder::new()
        .operation_id(Some(operation.id))
        .summary(Some(operation.description))
        .request_body(Some(request_body))
        .response(
            "200",
            ResponseBuilder::new()
                .description("Successful operation")
                .content("application/json", Content::new(Some(ok_schema)))
                .build(),
        )
        .response(
            "500",
            ResponseBuilder::new()
                .description("Internal server error")
                .content("application/json", Content::new(Some(error_schema)))
                .build(),
        )
        .build();

    PathItem::new(http_method(operation), spec_operation)
}

fn http_method(operation: &Operation) -> HttpMethod {
    match operation.method.as_str() {
        "GET" => HttpMethod::Get,
        "PUT" => HttpMethod::Put,
        "DELETE" => HttpMethod::Delete,
        _ => HttpMethod::Post,
    }
}

/// Interactive documentation page pointing at the JSON document.
pub async fn swagger_ui() -> Html<&'static str> {
    Html(SWAGGER_PAGE)
}

const SWAGGER_PAGE: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8" />
  <title>prompt-relay API</title>
  <link rel="stylesheet" href="https://unpkg.com/swagger-ui-dist@5/swagger-ui.css" />
</head>
<body>
  <div id="swagger-ui"></div>
  <script src="https://unpkg.com/swagger-ui-dist@5/swagger-ui-bundle.js"></script>
  <script>
    SwaggerUIBundle({
      url: "/api-docs/openapi.json",
      dom_id: "#swagger-ui",
    });
  </script>
</body>
</html>
"##;
