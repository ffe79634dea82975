pub mod http;
pub mod port;

#[cfg(test)]
pub(crate) mod fake;
