// one test binary for all API tests: binaries are linked sequentially, so
// bundling them keeps `cargo test` fast
//
// every test spawns the app against two `wiremock` servers, one for the
// subscriber registry and one for the mail API

mod subscribe;
mod unsubscribe;
