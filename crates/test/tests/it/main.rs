mod query;
mod startup;
