mod properties;
mod queries;
mod scopes;
