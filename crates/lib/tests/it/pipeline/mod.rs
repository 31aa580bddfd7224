mod create;
mod destroy;
mod update;
