// ABOUTME: API module containing the HTTP handler functions for the hrdesk REST API.
// ABOUTME: Currently a single chat endpoint; health lives beside the router.

pub mod chat;
