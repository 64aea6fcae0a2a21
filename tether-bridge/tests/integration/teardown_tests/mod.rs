mod test_drop_without_close;
mod test_fatal_invalid_candidate;
mod test_idempotent_close;
