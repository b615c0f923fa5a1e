use std::io::Read;
use std::process::exit;
use std::sync::Arc;

use faas_invoke_core::context::Context;
use faas_invoke_core::output::Output;
use faas_invoke_host::adapters::log_sink::StderrJsonSink;
use faas_invoke_host::handlers::invoke::handle_invocation;
use serde_json::{json, Value};

/// Built-in function for local runs: logs the call and echoes the request
/// back as JSON.
fn echo_function(context: &Context) -> Output {
    context.log([
        "handling",
        context.req.method.as_str(),
        context.req.path.as_str(),
    ]);

    context.res.json(
        &json!({
            "method": context.req.method,
            "url": context.req.url,
            "path": context.req.path,
            "query": context.req.query,
            "headers": context.req.headers,
            "bodyText": context.req.body.as_text(),
            "bodyJson": context.req.body.as_json(),
        }),
        None,
        None,
    )
}

fn main() {
    let mut raw_event = String::new();
    if let Err(error) = std::io::stdin().read_to_string(&mut raw_event) {
        eprintln!("failed to read invocation event from stdin: {error}");
        exit(1);
    }

    let event: Value = match serde_json::from_str(&raw_event) {
        Ok(value) => value,
        Err(error) => {
            eprintln!("invocation event is not valid JSON: {error}");
            exit(1);
        }
    };

    let sink = Arc::new(StderrJsonSink::new("local_invoke"));
    let response = handle_invocation(event, echo_function, sink);

    match serde_json::to_string_pretty(&response) {
        Ok(encoded) => println!("{encoded}"),
        Err(error) => {
            eprintln!("failed to serialize host response: {error}");
            exit(1);
        }
    }
}
