//! Integration tests for kicad-pcm-pack

mod helpers;
mod test_package;
