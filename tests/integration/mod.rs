mod caching_tests;
mod fixtures;
mod rendering_tests;
