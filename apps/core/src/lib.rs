pub mod browser;
pub mod config;
pub mod contract;
pub mod core_service;
pub mod cql;
pub mod label_dictionary;
pub mod links;
pub mod logging;
pub mod model;
pub mod omnibox;
pub mod query_dsl;
pub mod runtime;
pub mod search_url;
pub mod settings;
pub mod space_resolver;
pub mod store;
pub mod transport;

#[cfg(test)]
mod tests {
    mod query_latency_test {
        include!(concat!(
            env!("CARGO_MANIFEST_DIR"),
            "/../../tests/perf/query_latency_test.rs"
        ));
    }
}
