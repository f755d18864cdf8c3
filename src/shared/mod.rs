pub mod log_buffer;

#[cfg(test)]
pub(crate) mod test_support;
