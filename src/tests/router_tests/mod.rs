mod export_tests;
mod sale_routes_tests;
