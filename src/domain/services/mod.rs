// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

pub mod column_roles;
pub mod extraction_service;
pub mod rate_normalizer;
pub mod relevance_scorer;
pub mod row_extractor;
pub mod table_grid;
pub mod tenure_normalizer;
