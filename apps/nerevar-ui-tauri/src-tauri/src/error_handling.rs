use std::error::Error;

/// Joins an error with all of its sources, one `caused by:` line each.
pub fn format_error_chain<E: Error + ?Sized>(error: &E) -> String {
    let mut chain = vec![error.to_string()];
    let mut source = error.source();

    while let Some(err) = source {
        chain.push(format!("  caused by: {}", err));
        source = err.source();
    }

    chain.join("\n")
}

/// Converts a command result for the frontend, logging the failure with its
/// full chain.
pub fn to_command_result<T, E: Error>(context: &str, result: Result<T, E>) -> Result<T, String> {
    result.map_err(|e| {
        let chain = format_error_chain(&e);
        tracing::error!(context, error = %chain, "command failed");
        chain
    })
}
