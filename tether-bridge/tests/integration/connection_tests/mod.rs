mod test_bye_before_description;
mod test_offer_precedes_candidates;
mod test_signaling_connect_failure;
mod test_webrtc_end_to_end;
