mod corpus_properties;
mod matcher_properties;
mod safety_properties;
