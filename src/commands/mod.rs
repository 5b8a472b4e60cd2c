// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

pub mod business;
pub mod input;
pub mod settings;
pub mod report;
pub mod chart;
pub mod export;
pub mod doctor;
