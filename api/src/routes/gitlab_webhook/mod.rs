pub mod merge_request_route;
