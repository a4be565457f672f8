// Copyright 2024 OctoFHIR Team
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Shared fixtures for integration tests

#![allow(dead_code)]

use beanpath::{EngineState, ExpressionEngine, ListRef, MapRef, ObjectRef, Value, impl_bean};
use std::sync::Arc;

#[derive(Debug, Default)]
pub struct Address {
    pub street: String,
    pub city: String,
    pub zip: Option<i64>,
}

impl_bean!(Address {
    rw street: String,
    rw city: String,
    rw zip: Option<i64>,
});

#[derive(Debug, Default)]
pub struct Person {
    pub name: String,
    pub age: i64,
    pub active: bool,
    pub address: Option<ObjectRef>,
    pub addresses: Option<ListRef>,
    pub attributes: Option<MapRef>,
    pub password: String,
}

impl_bean!(Person {
    rw name: String,
    rw age: i64,
    rw active: bool,
    rw address: Option<ObjectRef>,
    rw addresses: Option<ListRef>,
    rw attributes: Option<MapRef>,
    wo password: String,
});

pub fn address(street: &str, city: &str) -> Value {
    Value::object(Address {
        street: street.into(),
        city: city.into(),
        zip: None,
    })
}

pub fn person() -> Value {
    Value::object(Person {
        name: "Ada".into(),
        age: 36,
        active: true,
        address: Some(ObjectRef::new(Address {
            street: "1 Main St".into(),
            city: "London".into(),
            zip: Some(10001),
        })),
        addresses: Some(ListRef::new(vec![
            address("2 High St", "Leeds"),
            address("3 Low Rd", "York"),
        ])),
        attributes: Some(MapRef::default()),
        password: String::new(),
    })
}

/// Engine on private caches
pub fn engine(enhanced: bool) -> ExpressionEngine {
    ExpressionEngine::builder()
        .with_state(Arc::new(EngineState::new()))
        .with_enhancement(enhanced)
        .build()
}

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}
