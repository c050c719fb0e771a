pub mod invite_links;
