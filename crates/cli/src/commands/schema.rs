//! Schema export command.

use product_graph_server::graphql;

/// Print the GraphQL SDL to stdout.
pub fn print() {
    #[allow(clippy::print_stdout)]
    {
        println!("{}", graphql::sdl());
    }
}
